//! Task types at each stage of planning
//!
//! `TaskSpec` (unscheduled) -> `ScheduledTask` (dated by the allocator).
//! `TaskRecord` is the string-dated shape the CRUD layer hands back in.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::priority::Priority;
use super::window::{DateWindow, WindowError, parse_iso_date};

/// Maximum title length in characters
pub const MAX_TITLE_CHARS: usize = 200;

/// Errors building a task from untrusted input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    #[error("Task title is empty")]
    BlankTitle,
}

/// An unscheduled task description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SpecFields")]
pub struct TaskSpec {
    /// Short title (max 200 chars)
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub priority: Priority,

    /// Risk or caveat surfaced next to the task
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning_text: Option<String>,

    /// Dates proposed by the model, if it gave a usable pair
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested: Option<DateWindow>,
}

impl TaskSpec {
    /// Create a spec, truncating the title to [`MAX_TITLE_CHARS`]
    pub fn new(title: impl Into<String>, priority: Priority) -> Self {
        Self {
            title: truncate_title(title.into()),
            description: None,
            priority,
            warning_text: None,
            suggested: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning_text = Some(warning.into());
        self
    }

    pub fn with_suggested(mut self, window: DateWindow) -> Self {
        self.suggested = Some(window);
        self
    }

    /// Whether the title has any non-whitespace text
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpecFields {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    warning_text: Option<String>,
    #[serde(default)]
    suggested: Option<DateWindow>,
}

impl TryFrom<SpecFields> for TaskSpec {
    type Error = TaskError;

    fn try_from(fields: SpecFields) -> Result<Self, Self::Error> {
        if fields.title.trim().is_empty() {
            return Err(TaskError::BlankTitle);
        }
        Ok(Self {
            title: truncate_title(fields.title),
            description: fields.description,
            priority: fields.priority,
            warning_text: fields.warning_text,
            suggested: fields.suggested,
        })
    }
}

fn truncate_title(title: String) -> String {
    let trimmed = title.trim();
    if trimmed.chars().count() <= MAX_TITLE_CHARS {
        return trimmed.to_string();
    }
    debug!(len = trimmed.len(), "truncate_title: title too long, truncating");
    trimmed.chars().take(MAX_TITLE_CHARS).collect()
}

/// Work status as tracked by the CRUD layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    #[default]
    Todo,
    InProgress,
    #[serde(alias = "done")]
    Completed,
}

impl std::fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Todo => write!(f, "todo"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// A task with concrete dates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTask {
    #[serde(flatten)]
    pub spec: TaskSpec,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    /// 0-based position in the planned sequence
    pub order: usize,

    /// Task whose start this one was placed against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_task_index: Option<usize>,

    #[serde(default)]
    pub status: WorkStatus,
}

impl ScheduledTask {
    pub fn title(&self) -> &str {
        &self.spec.title
    }

    pub fn priority(&self) -> Priority {
        self.spec.priority
    }

    /// Length in whole days
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Whether the task ends after the window closes
    pub fn overruns(&self, window: &DateWindow) -> bool {
        self.end_date > window.end()
    }
}

/// A task as stored by the CRUD layer, dates still as strings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub priority: Option<String>,

    #[serde(default)]
    pub warning_text: Option<String>,

    #[serde(default)]
    pub start_date: Option<String>,

    #[serde(default)]
    pub end_date: Option<String>,

    #[serde(default)]
    pub order: Option<usize>,

    #[serde(default)]
    pub status: WorkStatus,
}

impl TaskRecord {
    /// Spec portion of the record, with the priority normalized
    pub fn spec(&self) -> TaskSpec {
        let mut spec = TaskSpec::new(self.title.clone(), Priority::normalize(self.priority.as_deref()));
        spec.description = self.description.clone();
        spec.warning_text = self.warning_text.clone();
        spec
    }

    /// Parse the record's dates into a [`ScheduledTask`]
    ///
    /// Fails on a missing or unparseable date, or an end before the start.
    pub fn to_scheduled(&self, fallback_order: usize) -> Result<ScheduledTask, WindowError> {
        let start = parse_iso_date(self.start_date.as_deref().unwrap_or_default())?;
        let end = parse_iso_date(self.end_date.as_deref().unwrap_or_default())?;
        DateWindow::new(start, end)?;
        Ok(ScheduledTask {
            spec: self.spec(),
            start_date: start,
            end_date: end,
            order: self.order.unwrap_or(fallback_order),
            previous_task_index: None,
            status: self.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_truncated_on_char_boundary() {
        let long = "é".repeat(250);
        let spec = TaskSpec::new(long, Priority::Low);
        assert_eq!(spec.title.chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_title_trimmed() {
        let spec = TaskSpec::new("  Define requirements  ", Priority::High);
        assert_eq!(spec.title, "Define requirements");
    }

    #[test]
    fn test_deserialize_truncates_long_title() {
        let json = format!(r#"{{"title": "{}", "priority": "high"}}"#, "x".repeat(300));
        let spec: TaskSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec.title.chars().count(), MAX_TITLE_CHARS);
        assert_eq!(spec.priority, Priority::High);
    }

    #[test]
    fn test_deserialize_rejects_blank_title() {
        let err = serde_json::from_str::<TaskSpec>(r#"{"title": "   "}"#).unwrap_err();
        assert!(err.to_string().contains("Task title is empty"));
    }

    #[test]
    fn test_scheduled_task_deserialize_validates_flattened_spec() {
        let json = format!(
            r#"{{"title": "{}", "startDate": "2025-01-01", "endDate": "2025-01-05", "order": 0}}"#,
            "y".repeat(250)
        );
        let task: ScheduledTask = serde_json::from_str(&json).unwrap();
        assert_eq!(task.title().chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_work_status_accepts_done_alias() {
        let status: WorkStatus = serde_json::from_str("\"done\"").unwrap();
        assert_eq!(status, WorkStatus::Completed);
    }

    #[test]
    fn test_scheduled_task_serializes_flat_camel_case() {
        let task = ScheduledTask {
            spec: TaskSpec::new("Kickoff", Priority::High).with_warning("Needs sponsor"),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 4).unwrap(),
            order: 0,
            previous_task_index: None,
            status: WorkStatus::Todo,
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["title"], "Kickoff");
        assert_eq!(json["warningText"], "Needs sponsor");
        assert_eq!(json["startDate"], "2025-01-01");
        assert_eq!(json["endDate"], "2025-01-04");
        assert_eq!(json["priority"], "high");
        assert!(json.get("previousTaskIndex").is_none());
        assert_eq!(task.duration_days(), 3);
    }

    #[test]
    fn test_record_to_scheduled() {
        let record: TaskRecord = serde_json::from_str(
            r#"{"title":"Build","priority":"HIGH","startDate":"2025-01-05","endDate":"2025-01-10","status":"done"}"#,
        )
        .unwrap();
        let task = record.to_scheduled(3).unwrap();
        assert_eq!(task.priority(), Priority::High);
        assert_eq!(task.order, 3);
        assert_eq!(task.status, WorkStatus::Completed);
    }

    #[test]
    fn test_record_with_bad_dates() {
        let record = TaskRecord {
            title: "Broken".to_string(),
            description: None,
            priority: None,
            warning_text: None,
            start_date: Some("not a date".to_string()),
            end_date: Some("2025-01-10".to_string()),
            order: None,
            status: WorkStatus::Todo,
        };
        assert!(record.to_scheduled(0).is_err());

        let missing = TaskRecord {
            start_date: None,
            ..record.clone()
        };
        assert!(missing.to_scheduled(0).is_err());

        let inverted = TaskRecord {
            start_date: Some("2025-01-11".to_string()),
            ..record
        };
        assert!(matches!(
            inverted.to_scheduled(0),
            Err(WindowError::EndBeforeStart { .. })
        ));
    }
}
