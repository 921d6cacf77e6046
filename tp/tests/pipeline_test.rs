//! Integration tests for the planning pipeline
//!
//! Drive extraction, allocation and layout through the public API with
//! small scripted LLM clients.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use taskplanner::domain::{DateWindow, Priority, TaskRecord, WorkStatus, parse_iso_datetime};
use taskplanner::extract::{ConversationExtractor, TemplateLibrary};
use taskplanner::gantt::{DurationMode, LayoutEngine, TimeStatus};
use taskplanner::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError};
use taskplanner::planning::{PlanSource, Planner};

/// Answers every call with the same text
struct CannedClient {
    text: String,
    calls: AtomicUsize,
}

impl CannedClient {
    fn new(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LlmClient for CannedClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CompletionResponse::text(self.text.clone()))
    }
}

/// Fails every call
struct DownClient {
    calls: AtomicUsize,
}

#[async_trait]
impl LlmClient for DownClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LlmError::ApiError {
            status: 500,
            message: "upstream unavailable".to_string(),
        })
    }
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn window() -> DateWindow {
    DateWindow::parse("2025-01-01", "2025-01-31").unwrap()
}

// =============================================================================
// Extraction to allocation
// =============================================================================

#[tokio::test]
async fn test_plan_from_fenced_reply() {
    let reply = r#"Here is the plan:
```json
{"tasks": [
  {"title": "Research market", "priority": "high", "description": "Competitors and pricing"},
  {"title": "Build MVP", "priority": "medium", "warningText": "Tight timeline"},
  {"title": "Launch", "priority": "low"}
]}
```
Let me know if you need changes."#;
    let client = CannedClient::new(reply);
    let planner = Planner::new(ConversationExtractor::new(client.clone(), TemplateLibrary::default()));

    let outcome = planner.plan("We want to launch a budgeting app", &window()).await;

    assert_eq!(outcome.source, PlanSource::Model);
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);

    // 30-day window, 3 tasks: total weight 6
    let starts: Vec<_> = outcome.tasks.iter().map(|t| t.start_date).collect();
    let ends: Vec<_> = outcome.tasks.iter().map(|t| t.end_date).collect();
    assert_eq!(starts, vec![date("2025-01-01"), date("2025-01-11"), date("2025-01-22")]);
    assert_eq!(ends, vec![date("2025-01-11"), date("2025-01-26"), date("2025-01-29")]);
    assert_eq!(outcome.tasks[1].spec.warning_text.as_deref(), Some("Tight timeline"));
    assert_eq!(outcome.tasks[2].previous_task_index, Some(1));
    assert!(outcome.warnings.is_empty());
}

#[tokio::test]
async fn test_plan_falls_back_when_model_is_down() {
    let client = Arc::new(DownClient {
        calls: AtomicUsize::new(0),
    });
    let planner = Planner::new(ConversationExtractor::new(client.clone(), TemplateLibrary::default()));

    let outcome = planner.plan("Organize the company summit in spring", &window()).await;

    assert_eq!(outcome.source, PlanSource::Fallback);
    assert_eq!(outcome.template.as_deref(), Some("event"));
    assert!(!outcome.tasks.is_empty());
    assert!(
        outcome
            .fallback_reason
            .as_deref()
            .is_some_and(|r| r.contains("upstream unavailable"))
    );
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_plan_with_all_invalid_tasks_falls_back() {
    let client = CannedClient::new(r#"{"tasks": [{"title": "  "}, {"description": "no title"}]}"#);
    let planner = Planner::new(ConversationExtractor::new(client, TemplateLibrary::default()));

    let outcome = planner.plan("Refactor the backend", &window()).await;

    assert_eq!(outcome.source, PlanSource::Fallback);
    assert_eq!(outcome.template.as_deref(), Some("software"));
}

#[tokio::test]
async fn test_suggested_dates_honored_when_enabled() {
    let client = CannedClient::new(
        r#"{"tasks": [
            {"title": "Kickoff", "startDate": "2025-01-05", "endDate": "2025-01-06"},
            {"title": "Wrap up", "startDate": "2025-01-20", "endDate": "2025-01-10"}
        ]}"#,
    );
    let planner =
        Planner::new(ConversationExtractor::new(client, TemplateLibrary::default())).use_suggested_dates(true);

    let outcome = planner.plan("Small internal project", &window()).await;

    assert_eq!(outcome.tasks[0].start_date, date("2025-01-05"));
    assert_eq!(outcome.tasks[0].end_date, date("2025-01-06"));
    // reversed hint is dropped, so the allocator's dates stand
    assert!(outcome.tasks[1].spec.suggested.is_none());
    assert_ne!(outcome.tasks[1].start_date, date("2025-01-20"));
}

// =============================================================================
// Allocation to layout
// =============================================================================

#[tokio::test]
async fn test_plan_then_layout() {
    let client = CannedClient::new(r#"{"tasks": [{"title": "A", "priority": "high"}, {"title": "B"}]}"#);
    let planner = Planner::new(ConversationExtractor::new(client, TemplateLibrary::default()));
    let outcome = planner.plan("Anything", &window()).await;

    let now = parse_iso_datetime("2025-01-16T12:00:00").unwrap();
    let layout = LayoutEngine::default().layout(&outcome.tasks, Some(&window()), now);

    assert_eq!(layout.mode, DurationMode::Percent);
    assert_eq!(layout.tasks.len(), 2);
    assert_eq!(layout.tasks[0].start_position_pct, 0.0);
    assert_eq!(layout.tasks[0].time_status, TimeStatus::Overdue);
    assert_eq!(layout.tasks[1].time_status, TimeStatus::InProgress);
    assert_eq!(layout.months.len(), 1);
    assert_eq!(layout.months[0].label, "January 2025");
    assert!(layout.today_pct.is_some_and(|p| p > 50.0 && p < 52.0));
    for task in &layout.tasks {
        assert!((0.0..=100.0).contains(&task.start_position_pct));
        assert!(task.duration_pct >= 1.0);
    }
}

#[test]
fn test_record_layout_isolates_bad_dates() {
    let records: Vec<TaskRecord> = serde_json::from_str(
        r#"[
            {"title": "Good", "priority": "HIGH", "startDate": "2025-02-01", "endDate": "2025-02-10", "status": "completed"},
            {"title": "Broken", "startDate": "not a date", "endDate": "2025-02-10"},
            {"title": "Later", "startDate": "2025-02-15T00:00:00Z", "endDate": "2025-03-05"}
        ]"#,
    )
    .unwrap();
    let now = parse_iso_datetime("2025-02-20").unwrap();

    let layout = LayoutEngine::default().layout_records(&records, None, now);

    assert_eq!(layout.mode, DurationMode::Days);
    let window = layout.window.unwrap();
    assert_eq!(window.start(), date("2025-02-01"));
    assert_eq!(window.end(), date("2025-03-05"));

    assert_eq!(layout.tasks[0].priority, Priority::High);
    assert_eq!(layout.tasks[0].status, WorkStatus::Completed);
    assert_eq!(layout.tasks[0].time_status, TimeStatus::Completed);
    assert_eq!(layout.tasks[0].duration_pct, 9.0);

    assert_eq!(layout.tasks[1].time_status, TimeStatus::Unknown);
    assert_eq!(layout.tasks[1].start_position_pct, 0.0);
    assert_eq!(layout.tasks[1].duration_pct, 1.0);
    assert!(layout.tasks[1].start_date.is_none());

    assert_eq!(layout.tasks[2].time_status, TimeStatus::InProgress);
    assert_eq!(layout.months.len(), 2);
}
