//! Conversation extraction
//!
//! Turns a free-text project conversation into an ordered `TaskSpec` list
//! with one completion call. Whatever goes wrong (network, empty reply,
//! unparseable JSON, no usable tasks) ends in the fallback branch with a
//! template list, so extraction itself never fails.
//!
//! ```text
//! conversation ─► prompt ─► LlmClient::complete ─► locate JSON ─► validate ─► Extracted
//!                                   │                    │             │
//!                                   └──── error ─────────┴─────────────┴──► Fallback(template)
//! ```

mod extractor;
mod parse;
mod prompt;
mod template;

pub use extractor::{ConversationExtractor, ExtractError, Extraction, ExtractorConfig};
pub use parse::{ParsedTasks, locate_json, parse_tasks};
pub use prompt::{PromptContext, SYSTEM_PROMPT, render_user_prompt};
pub use template::{Template, TemplateLibrary, builtin_templates};
