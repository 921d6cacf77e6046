//! Extraction prompt rendering

use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use crate::domain::DateWindow;

/// System prompt sent with every extraction request
pub const SYSTEM_PROMPT: &str = r#"You are a project planner. Read the project conversation and produce an ordered task list.

Respond with a single JSON object and nothing else:
{"tasks": [{"title": string, "description": string, "startDate": "YYYY-MM-DD", "endDate": "YYYY-MM-DD", "priority": "low" | "medium" | "high", "warningText": string}]}

Rules:
- List tasks in the order they should be worked on
- Titles are short imperatives, at most 200 characters
- Use "high" only for tasks that block what comes after them
- Add warningText only for a concrete risk
"#;

const USER_TEMPLATE: &str = r#"{{#if window_start}}Project window: {{window_start}} to {{window_end}}
Keep all task dates inside this window.

{{/if}}Plan between {{min_tasks}} and {{max_tasks}} tasks for this project conversation:

{{conversation}}
"#;

/// Values available to the user prompt template
#[derive(Debug, Clone, Serialize)]
pub struct PromptContext {
    pub conversation: String,
    pub window_start: Option<String>,
    pub window_end: Option<String>,
    pub min_tasks: usize,
    pub max_tasks: usize,
}

impl PromptContext {
    pub fn new(conversation: &str, window: Option<&DateWindow>) -> Self {
        debug!(conversation_len = conversation.len(), ?window, "PromptContext::new: called");
        Self {
            conversation: conversation.trim().to_string(),
            window_start: window.map(|w| w.start().to_string()),
            window_end: window.map(|w| w.end().to_string()),
            min_tasks: 3,
            max_tasks: 12,
        }
    }
}

/// Render the user message for an extraction request
pub fn render_user_prompt(ctx: &PromptContext) -> Result<String, handlebars::RenderError> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(handlebars::no_escape);
    hbs.render_template(USER_TEMPLATE, ctx)
}
