//! Plain-text Gantt chart for terminal output

use colored::*;

use super::layout::{DurationMode, GanttLayout, GanttTask, TimeStatus};

const TITLE_WIDTH: usize = 28;
const MIN_CHART_WIDTH: usize = 10;

/// Render a layout as a text chart `width` columns wide (bars only)
pub fn render_text(layout: &GanttLayout, width: usize) -> String {
    let width = width.max(MIN_CHART_WIDTH);
    let mut out = String::new();

    match &layout.window {
        Some(w) => out.push_str(&format!("{} {}\n", "Window:".bold(), w)),
        None => out.push_str(&format!("{}\n", "Window: (no dated tasks)".bold())),
    }

    out.push_str(&format!("{:w$} {}\n", "", month_axis(layout, width), w = TITLE_WIDTH));

    let today_col = layout.today_pct.map(|pct| column(pct, width));
    let window_days = layout.window.map(|w| w.duration_days()).unwrap_or(0);

    for task in &layout.tasks {
        let title = fit(&task.title, TITLE_WIDTH);
        let cells = bar(task, layout.mode, window_days, width, today_col);
        out.push_str(&format!(
            "{:w$} {} {} {}\n",
            title,
            cells,
            status_label(task.time_status),
            task.priority.to_string().dimmed(),
            w = TITLE_WIDTH
        ));
        if let Some(warning) = &task.warning_text {
            out.push_str(&format!("{:w$} {} {}\n", "", "!".yellow(), warning, w = TITLE_WIDTH));
        }
    }

    if let Some(col) = today_col {
        out.push_str(&format!("{:w$} {}{}\n", "", " ".repeat(col), "^ today".cyan(), w = TITLE_WIDTH));
    }

    out
}

fn column(pct: f64, width: usize) -> usize {
    let col = (pct / 100.0 * width as f64).round() as usize;
    col.min(width - 1)
}

fn span_pct(task: &GanttTask, mode: DurationMode, window_days: i64) -> f64 {
    match mode {
        DurationMode::Percent => task.duration_pct,
        DurationMode::Days if window_days > 0 => task.duration_pct / window_days as f64 * 100.0,
        DurationMode::Days => 100.0,
    }
}

fn bar(task: &GanttTask, mode: DurationMode, window_days: i64, width: usize, today: Option<usize>) -> String {
    if task.time_status == TimeStatus::Unknown {
        return "?".repeat(width).dimmed().to_string();
    }

    let start = column(task.start_position_pct, width);
    let len = ((span_pct(task, mode, window_days) / 100.0 * width as f64).round() as usize).max(1);
    let end = (start + len).min(width);

    let cells: String = (0..width)
        .map(|col| {
            if (start..end).contains(&col) {
                '█'
            } else if Some(col) == today {
                '│'
            } else {
                '·'
            }
        })
        .collect();

    match task.time_status {
        TimeStatus::Upcoming => cells.blue().to_string(),
        TimeStatus::InProgress => cells.yellow().to_string(),
        TimeStatus::Overdue => cells.red().to_string(),
        TimeStatus::Completed => cells.green().to_string(),
        TimeStatus::Unknown => cells.dimmed().to_string(),
    }
}

fn status_label(status: TimeStatus) -> ColoredString {
    let text = status.to_string();
    match status {
        TimeStatus::Upcoming => text.blue(),
        TimeStatus::InProgress => text.yellow(),
        TimeStatus::Overdue => text.red().bold(),
        TimeStatus::Completed => text.green(),
        TimeStatus::Unknown => text.dimmed(),
    }
}

/// Month labels placed at each month's start column
fn month_axis(layout: &GanttLayout, width: usize) -> String {
    let Some(window) = layout.window else {
        return String::new();
    };
    let span = window.duration_days();
    let mut axis = vec![' '; width];

    for bucket in &layout.months {
        let offset = (bucket.month_start - window.start()).num_days().max(0);
        let col = if span > 0 {
            column(offset as f64 / span as f64 * 100.0, width)
        } else {
            0
        };
        for (i, ch) in bucket.label.chars().enumerate() {
            if col + i < width {
                axis[col + i] = ch;
            }
        }
    }

    axis.into_iter().collect::<String>().trim_end().to_string()
}

fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DateWindow, Priority, ScheduledTask, TaskSpec, WorkStatus};
    use crate::gantt::layout;
    use chrono::{NaiveDate, NaiveTime};

    fn task(title: &str, start: &str, end: &str) -> ScheduledTask {
        ScheduledTask {
            spec: TaskSpec::new(title, Priority::High).with_warning("Vendor lead time"),
            start_date: NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            end_date: NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap(),
            order: 0,
            previous_task_index: None,
            status: WorkStatus::Todo,
        }
    }

    #[test]
    fn test_render_contains_titles_and_axis() {
        let w = DateWindow::parse("2025-03-15", "2025-05-02").unwrap();
        let now = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap().and_time(NaiveTime::MIN);
        let l = layout(&[task("Define requirements", "2025-03-15", "2025-03-25")], Some(&w), now);

        let text = render_text(&l, 60);
        assert!(text.contains("Define requirements"));
        assert!(text.contains("March 2025"));
        assert!(text.contains("Vendor lead time"));
        assert!(text.contains("overdue"));
        assert!(text.contains("today"));
    }

    #[test]
    fn test_fit_truncates_long_titles() {
        let out = fit(&"x".repeat(40), 10);
        assert_eq!(out.chars().count(), 10);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn test_render_empty_layout() {
        let now = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap().and_time(NaiveTime::MIN);
        let l = layout(&[], None, now);
        let text = render_text(&l, 40);
        assert!(text.contains("no dated tasks"));
    }
}
