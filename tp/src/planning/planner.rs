//! Planner - wires extraction to the allocator

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{DateWindow, ScheduledTask};
use crate::extract::{ConversationExtractor, Extraction};
use crate::schedule::{allocate, overruns};

/// Where the planned tasks came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
    Model,
    Fallback,
}

/// Result of planning one conversation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOutcome {
    pub source: PlanSource,
    /// Template name when `source` is `Fallback`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Why extraction fell back, if it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    pub window: DateWindow,
    pub tasks: Vec<ScheduledTask>,
    pub warnings: Vec<String>,
}

impl PlanOutcome {
    pub fn is_fallback(&self) -> bool {
        self.source == PlanSource::Fallback
    }
}

/// Extract-then-allocate pipeline
pub struct Planner {
    extractor: ConversationExtractor,
    use_suggested_dates: bool,
}

impl Planner {
    pub fn new(extractor: ConversationExtractor) -> Self {
        Self {
            extractor,
            use_suggested_dates: false,
        }
    }

    /// Prefer model-proposed dates over allocated ones where present
    pub fn use_suggested_dates(mut self, enabled: bool) -> Self {
        self.use_suggested_dates = enabled;
        self
    }

    /// Plan a conversation inside `window`
    pub async fn plan(&self, conversation: &str, window: &DateWindow) -> PlanOutcome {
        info!(%window, "Planning conversation");
        let extraction = self.extractor.extract(conversation, Some(window)).await;
        schedule(extraction, window, self.use_suggested_dates)
    }
}

/// Allocate an extraction's tasks and collect warnings
pub fn schedule(extraction: Extraction, window: &DateWindow, use_suggested_dates: bool) -> PlanOutcome {
    debug!(is_fallback = extraction.is_fallback(), %use_suggested_dates, "schedule: called");
    let (source, template, fallback_reason, specs) = match extraction {
        Extraction::Extracted { tasks } => (PlanSource::Model, None, None, tasks),
        Extraction::Fallback { template, tasks, reason } => {
            (PlanSource::Fallback, Some(template), Some(reason), tasks)
        }
    };

    let mut tasks = allocate(&specs, window);
    let mut warnings = Vec::new();

    if use_suggested_dates {
        for task in &mut tasks {
            if let Some(hint) = task.spec.suggested {
                debug!(order = task.order, %hint, "schedule: using suggested dates");
                task.start_date = hint.start();
                task.end_date = hint.end();
            }
        }
    }

    for task in overruns(&tasks, window) {
        warnings.push(format!(
            "Task {} '{}' ends {} after the window closes on {}",
            task.order + 1,
            task.title(),
            task.end_date,
            window.end()
        ));
    }

    if let Some(reason) = &fallback_reason {
        warnings.push(format!("Used fallback template: {}", reason));
    }

    info!(task_count = tasks.len(), warning_count = warnings.len(), "Plan scheduled");
    PlanOutcome {
        source,
        template,
        fallback_reason,
        window: *window,
        tasks,
        warnings,
    }
}
