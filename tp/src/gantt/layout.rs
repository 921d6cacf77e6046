//! Layout engine - dates to percentages

use std::fmt::Write;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{DateWindow, Priority, ScheduledTask, TaskRecord, WorkStatus};

const DAY_MS: f64 = 86_400_000.0;

/// Default month label, e.g. "March 2025"
pub const DEFAULT_MONTH_LABEL_FORMAT: &str = "%B %Y";

/// Temporal status of a task relative to "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeStatus {
    Upcoming,
    InProgress,
    Overdue,
    Completed,
    /// Dates could not be read
    Unknown,
}

impl std::fmt::Display for TimeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upcoming => write!(f, "upcoming"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Overdue => write!(f, "overdue"),
            Self::Completed => write!(f, "completed"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// How `duration_pct` is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationMode {
    /// Percentage of the window span, at least 1
    Percent,
    /// Whole days, at least 1
    Days,
}

/// A scheduled task annotated for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttTask {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_text: Option<String>,
    pub order: usize,
    pub status: WorkStatus,
    /// `None` when the source dates were unreadable
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Offset from the window start, in [0, 100]
    pub start_position_pct: f64,
    /// Percent of the window or day count, per the layout's [`DurationMode`]
    pub duration_pct: f64,
    pub time_status: TimeStatus,
}

/// One calendar month on the time axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    pub label: String,
    pub month_start: NaiveDate,
}

/// Render-ready chart data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GanttLayout {
    /// Window the coordinates are relative to (`None` if nothing had dates)
    pub window: Option<DateWindow>,
    pub mode: DurationMode,
    pub tasks: Vec<GanttTask>,
    pub months: Vec<MonthBucket>,
    /// Position of "now" inside the window, if it falls inside
    pub today_pct: Option<f64>,
}

/// Layout engine carrying display options
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    month_label_format: String,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(DEFAULT_MONTH_LABEL_FORMAT)
    }
}

impl LayoutEngine {
    pub fn new(month_label_format: impl Into<String>) -> Self {
        Self {
            month_label_format: month_label_format.into(),
        }
    }

    /// Lay out already-dated tasks
    ///
    /// With a window, durations are percentages of it (day counts if it has
    /// zero length). Without one, the tasks' own extent is the display
    /// window and durations are day counts.
    pub fn layout(&self, tasks: &[ScheduledTask], window: Option<&DateWindow>, now: NaiveDateTime) -> GanttLayout {
        debug!(task_count = tasks.len(), ?window, %now, "LayoutEngine::layout: called");
        let (display, mode) = self.display_window(window, tasks.iter().map(|t| (t.start_date, t.end_date)));

        let gantt_tasks = tasks
            .iter()
            .map(|t| place(t, display.as_ref(), mode, now))
            .collect();

        self.finish(display, mode, gantt_tasks, now)
    }

    /// Lay out string-dated records from the CRUD layer
    ///
    /// A record with unreadable dates gets `Unknown` status and a zero
    /// position; the rest of the batch is unaffected.
    pub fn layout_records(&self, records: &[TaskRecord], window: Option<&DateWindow>, now: NaiveDateTime) -> GanttLayout {
        debug!(record_count = records.len(), ?window, "LayoutEngine::layout_records: called");
        let parsed: Vec<_> = records
            .iter()
            .enumerate()
            .map(|(idx, record)| record.to_scheduled(idx))
            .collect();

        let (display, mode) = self.display_window(
            window,
            parsed.iter().flatten().map(|t| (t.start_date, t.end_date)),
        );

        let gantt_tasks = parsed
            .iter()
            .zip(records)
            .enumerate()
            .map(|(idx, (result, record))| match result {
                Ok(task) => place(task, display.as_ref(), mode, now),
                Err(e) => {
                    warn!(title = %record.title, error = %e, "layout_records: unreadable task dates");
                    unplaced(record, idx)
                }
            })
            .collect();

        self.finish(display, mode, gantt_tasks, now)
    }

    fn display_window<I>(&self, window: Option<&DateWindow>, ranges: I) -> (Option<DateWindow>, DurationMode)
    where
        I: IntoIterator<Item = (NaiveDate, NaiveDate)>,
    {
        match window {
            Some(w) if w.duration_ms() > 0 => (Some(*w), DurationMode::Percent),
            Some(w) => {
                debug!("display_window: zero-length window, using day counts");
                (Some(*w), DurationMode::Days)
            }
            None => (DateWindow::enclosing(ranges), DurationMode::Days),
        }
    }

    fn finish(&self, window: Option<DateWindow>, mode: DurationMode, tasks: Vec<GanttTask>, now: NaiveDateTime) -> GanttLayout {
        let months = window
            .as_ref()
            .map(|w| month_buckets(w, &self.month_label_format))
            .unwrap_or_default();
        let today_pct = window.as_ref().and_then(|w| today_position(w, now));

        GanttLayout {
            window,
            mode,
            tasks,
            months,
            today_pct,
        }
    }
}

/// Lay out tasks with the default month label format
pub fn layout(tasks: &[ScheduledTask], window: Option<&DateWindow>, now: NaiveDateTime) -> GanttLayout {
    LayoutEngine::default().layout(tasks, window, now)
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn place(task: &ScheduledTask, window: Option<&DateWindow>, mode: DurationMode, now: NaiveDateTime) -> GanttTask {
    let start_position_pct = window.map(|w| position_pct(w, midnight(task.start_date))).unwrap_or(0.0);
    let span_ms = (task.end_date - task.start_date).num_milliseconds() as f64;

    let duration_pct = match (mode, window) {
        (DurationMode::Percent, Some(w)) => (span_ms / w.duration_ms() as f64 * 100.0).max(1.0),
        _ => (span_ms / DAY_MS).ceil().max(1.0),
    };

    GanttTask {
        title: task.spec.title.clone(),
        description: task.spec.description.clone(),
        priority: task.spec.priority,
        warning_text: task.spec.warning_text.clone(),
        order: task.order,
        status: task.status,
        start_date: Some(task.start_date),
        end_date: Some(task.end_date),
        start_position_pct,
        duration_pct,
        time_status: classify(task.start_date, task.end_date, task.status, now),
    }
}

fn unplaced(record: &TaskRecord, idx: usize) -> GanttTask {
    let spec = record.spec();
    GanttTask {
        title: spec.title,
        description: spec.description,
        priority: spec.priority,
        warning_text: spec.warning_text,
        order: record.order.unwrap_or(idx),
        status: record.status,
        start_date: None,
        end_date: None,
        start_position_pct: 0.0,
        duration_pct: 1.0,
        time_status: TimeStatus::Unknown,
    }
}

/// Position of an instant inside the window, clamped to [0, 100]
fn position_pct(window: &DateWindow, at: NaiveDateTime) -> f64 {
    let span = window.duration_ms();
    if span <= 0 {
        return 0.0;
    }
    let offset = (at - midnight(window.start())).num_milliseconds() as f64;
    (offset / span as f64 * 100.0).clamp(0.0, 100.0)
}

fn today_position(window: &DateWindow, now: NaiveDateTime) -> Option<f64> {
    if window.duration_ms() <= 0 || now < midnight(window.start()) || now > midnight(window.end()) {
        return None;
    }
    Some(position_pct(window, now))
}

/// Classify a task against "now"
///
/// Dates compare as midnight of their day.
pub fn classify(start: NaiveDate, end: NaiveDate, status: WorkStatus, now: NaiveDateTime) -> TimeStatus {
    if now < midnight(start) {
        TimeStatus::Upcoming
    } else if now > midnight(end) {
        if status == WorkStatus::Completed {
            TimeStatus::Completed
        } else {
            TimeStatus::Overdue
        }
    } else {
        TimeStatus::InProgress
    }
}

/// One bucket per calendar month touched by the window, ascending
pub fn month_buckets(window: &DateWindow, label_format: &str) -> Vec<MonthBucket> {
    let start = window.start();
    let Some(mut cursor) = NaiveDate::from_ymd_opt(start.year(), start.month(), 1) else {
        return Vec::new();
    };

    let mut buckets = Vec::new();
    while cursor <= window.end() {
        buckets.push(MonthBucket {
            label: month_label(cursor, label_format),
            month_start: cursor,
        });
        match cursor.checked_add_months(Months::new(1)) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    buckets
}

fn month_label(month: NaiveDate, format: &str) -> String {
    let mut label = String::new();
    if write!(label, "{}", month.format(format)).is_err() {
        warn!(%format, "month_label: invalid month label format, using %Y-%m");
        return month.format("%Y-%m").to_string();
    }
    label
}
