//! ConversationExtractor - one completion call, validated, with fallback

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::parse::parse_tasks;
use super::prompt::{PromptContext, SYSTEM_PROMPT, render_user_prompt};
use super::template::TemplateLibrary;
use crate::domain::{DateWindow, TaskSpec};
use crate::llm::{CompletionRequest, LlmClient, LlmError, Message};

/// Why extraction fell back to a template
///
/// Never returned to callers of [`ConversationExtractor::extract`]; it is
/// folded into [`Extraction::Fallback`].
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Completion call failed: {0}")]
    Completion(#[from] LlmError),

    #[error("Failed to render prompt: {0}")]
    Prompt(String),

    #[error("Completion returned no text")]
    EmptyResponse,

    #[error("No JSON object found in response")]
    NoJson,

    #[error("Malformed JSON in response: {0}")]
    MalformedJson(String),

    #[error("Response JSON has no 'tasks' array")]
    MissingTasks,

    #[error("Response contained no valid tasks ({skipped} skipped)")]
    NoValidTasks { skipped: usize },
}

/// Outcome of an extraction; both branches carry a usable task list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Extraction {
    /// Tasks parsed from the model's reply
    Extracted { tasks: Vec<TaskSpec> },
    /// Template tasks, with the reason extraction was not used
    Fallback {
        template: String,
        tasks: Vec<TaskSpec>,
        reason: String,
    },
}

impl Extraction {
    /// Fallback built from the library's choice for this conversation
    pub fn fallback(library: &TemplateLibrary, conversation: &str, reason: impl Into<String>) -> Self {
        let template = library.select(conversation);
        let reason = reason.into();
        info!(template = %template.name, %reason, "Extraction::fallback: using template");
        Self::Fallback {
            template: template.name.clone(),
            tasks: template.tasks.clone(),
            reason,
        }
    }

    pub fn tasks(&self) -> &[TaskSpec] {
        match self {
            Self::Extracted { tasks } | Self::Fallback { tasks, .. } => tasks,
        }
    }

    pub fn into_tasks(self) -> Vec<TaskSpec> {
        match self {
            Self::Extracted { tasks } | Self::Fallback { tasks, .. } => tasks,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Request settings for extraction
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// System prompt sent with each request
    pub system_prompt: String,
    /// Max tokens requested for the reply
    pub max_tokens: u32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
            max_tokens: 4096,
        }
    }
}

/// Extracts ordered task specs from a project conversation
///
/// Holds no per-call state, so one extractor can serve concurrent
/// planning sessions.
pub struct ConversationExtractor {
    llm: Arc<dyn LlmClient>,
    templates: TemplateLibrary,
    config: ExtractorConfig,
}

impl ConversationExtractor {
    pub fn new(llm: Arc<dyn LlmClient>, templates: TemplateLibrary) -> Self {
        Self::with_config(llm, templates, ExtractorConfig::default())
    }

    pub fn with_config(llm: Arc<dyn LlmClient>, templates: TemplateLibrary, config: ExtractorConfig) -> Self {
        Self { llm, templates, config }
    }

    pub fn templates(&self) -> &TemplateLibrary {
        &self.templates
    }

    /// Extract tasks with exactly one completion call
    ///
    /// Any failure yields [`Extraction::Fallback`]; this never errors.
    pub async fn extract(&self, conversation: &str, window: Option<&DateWindow>) -> Extraction {
        info!(conversation_len = conversation.len(), "Extracting tasks from conversation");
        match self.try_extract(conversation, window).await {
            Ok(tasks) => {
                info!(task_count = tasks.len(), "Extracted tasks from completion");
                Extraction::Extracted { tasks }
            }
            Err(e) => {
                warn!(error = %e, "Extraction failed, falling back to template");
                Extraction::fallback(&self.templates, conversation, e.to_string())
            }
        }
    }

    async fn try_extract(&self, conversation: &str, window: Option<&DateWindow>) -> Result<Vec<TaskSpec>, ExtractError> {
        let user_prompt = render_user_prompt(&PromptContext::new(conversation, window))
            .map_err(|e| ExtractError::Prompt(e.to_string()))?;

        let request = CompletionRequest {
            system_prompt: self.config.system_prompt.clone(),
            messages: vec![Message::user(user_prompt)],
            max_tokens: self.config.max_tokens,
        };

        let response = self.llm.complete(request).await?;
        debug!(stop_reason = ?response.stop_reason, "try_extract: got response");

        let text = response
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or(ExtractError::EmptyResponse)?;

        let parsed = parse_tasks(&text)?;
        if parsed.skipped > 0 {
            warn!(skipped = parsed.skipped, "try_extract: some tasks were dropped");
        }
        Ok(parsed.tasks)
    }
}
