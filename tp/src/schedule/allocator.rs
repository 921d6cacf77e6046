//! Priority-weighted sequential allocator

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{DateWindow, Priority, ScheduledTask, TaskSpec, WorkStatus, add_days};

/// Fraction of the previous task's duration the next task may overlap it by
pub const OVERLAP_RATIO: f64 = 0.3;

/// Fixed weight per task used for the window share (not the sum of factors)
pub const WEIGHT_PER_TASK: f64 = 2.0;

/// Nominal duration for one task
///
/// `max(min_days, floor(window_days / total_weight * factor))`
pub fn nominal_duration_days(window_days: i64, task_count: usize, priority: Priority) -> i64 {
    let total_weight = WEIGHT_PER_TASK * task_count as f64;
    if total_weight <= 0.0 {
        return priority.min_days();
    }
    let share = (window_days as f64 / total_weight * priority.duration_factor()).floor() as i64;
    share.max(priority.min_days())
}

/// Assign dates to `tasks` inside `window`
///
/// Task 0 starts at `window.start`. Each following task starts when its
/// predecessor ends if the predecessor is High priority, otherwise
/// `floor(prev_duration * 0.3)` days earlier, never before `window.start`.
/// End dates are not clamped to `window.end`; see [`overruns`].
pub fn allocate(tasks: &[TaskSpec], window: &DateWindow) -> Vec<ScheduledTask> {
    debug!(task_count = tasks.len(), %window, "allocate: called");
    if tasks.is_empty() {
        debug!("allocate: no tasks");
        return Vec::new();
    }

    let window_days = window.duration_days();
    let mut scheduled: Vec<ScheduledTask> = Vec::with_capacity(tasks.len());

    for (idx, spec) in tasks.iter().enumerate() {
        let duration = nominal_duration_days(window_days, tasks.len(), spec.priority);
        let previous = idx.checked_sub(1);
        let start = match previous.map(|p| &scheduled[p]) {
            None => window.start(),
            Some(prev) => next_start(prev, window.start()),
        };
        let end = add_days(start, duration);
        debug!(idx, %start, %end, duration, priority = %spec.priority, "allocate: placed task");

        scheduled.push(ScheduledTask {
            spec: spec.clone(),
            start_date: start,
            end_date: end,
            order: idx,
            previous_task_index: previous,
            status: WorkStatus::Todo,
        });
    }

    scheduled
}

fn next_start(prev: &ScheduledTask, window_start: NaiveDate) -> NaiveDate {
    if prev.priority().blocks_overlap() {
        return prev.end_date;
    }
    let overlap = (prev.duration_days() as f64 * OVERLAP_RATIO).floor() as i64;
    add_days(prev.end_date, -overlap).max(window_start)
}

/// Tasks that end after the window closes
pub fn overruns<'a>(tasks: &'a [ScheduledTask], window: &DateWindow) -> Vec<&'a ScheduledTask> {
    tasks.iter().filter(|t| t.overruns(window)).collect()
}
