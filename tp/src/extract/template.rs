//! Fallback templates
//!
//! Immutable task lists used when extraction cannot produce tasks. The
//! library is plain data handed to the extractor; selection is a pure
//! function of the conversation text.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Priority, TaskSpec};

/// A named fallback task list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,

    /// Words or phrases that select this template (case-insensitive)
    #[serde(default)]
    pub keywords: Vec<String>,

    pub tasks: Vec<TaskSpec>,
}

impl Template {
    fn matches(&self, normalized_text: &str) -> bool {
        self.keywords.iter().any(|kw| {
            let kw = normalize(kw);
            !kw.trim().is_empty() && normalized_text.contains(&kw)
        })
    }
}

/// Lowercase, collapse everything that isn't alphanumeric into single
/// spaces, and pad with spaces so phrases match on word boundaries
fn normalize(text: &str) -> String {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect();
    format!(" {} ", words.join(" "))
}

/// Ordered set of fallback templates
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLibrary {
    templates: Vec<Template>,
    default_name: String,
}

impl Default for TemplateLibrary {
    fn default() -> Self {
        Self::new(builtin_templates(), "general")
    }
}

impl TemplateLibrary {
    /// Build a library, dropping untitled tasks and then empty templates
    ///
    /// If nothing usable is left, the built-in templates are used instead,
    /// so [`select`](Self::select) always has something to return.
    pub fn new(templates: Vec<Template>, default_name: impl Into<String>) -> Self {
        let mut usable: Vec<Template> = templates
            .into_iter()
            .map(|mut t| {
                t.tasks.retain(TaskSpec::has_title);
                t
            })
            .filter(|t| !t.tasks.is_empty())
            .collect();
        if usable.is_empty() {
            debug!("TemplateLibrary::new: no usable templates, using built-ins");
            usable = builtin_templates();
        }
        Self {
            templates: usable,
            default_name: default_name.into(),
        }
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Pick the template for a conversation
    ///
    /// First keyword match in library order, then the default template by
    /// name, then the first template.
    pub fn select(&self, conversation: &str) -> &Template {
        let text = normalize(conversation);
        if let Some(t) = self.templates.iter().find(|t| t.matches(&text)) {
            debug!(template = %t.name, "TemplateLibrary::select: keyword match");
            return t;
        }
        self.templates
            .iter()
            .find(|t| t.name == self.default_name)
            .unwrap_or(&self.templates[0])
    }
}

fn task(title: &str, priority: Priority, description: &str) -> TaskSpec {
    TaskSpec::new(title, priority).with_description(description)
}

/// Templates compiled into the binary
pub fn builtin_templates() -> Vec<Template> {
    vec![
        Template {
            name: "software".to_string(),
            keywords: [
                "software", "app", "application", "website", "web site", "api", "backend", "frontend", "mobile",
                "feature", "code", "develop", "development", "saas",
            ]
            .map(String::from)
            .to_vec(),
            tasks: vec![
                task("Gather requirements", Priority::High, "Agree on users, scope and acceptance criteria"),
                task("Design architecture", Priority::High, "Choose the stack and sketch components and data flow"),
                task("Implement core features", Priority::Medium, "Build the must-have functionality")
                    .with_warning("Scope creep here is the most common cause of overrun"),
                task("Test and fix defects", Priority::Medium, "Automated and manual testing, bug triage"),
                task("Deploy to production", Priority::Medium, "Release, monitor and roll back if needed"),
                task("Write documentation", Priority::Low, "User guide and operational runbook"),
            ],
        },
        Template {
            name: "event".to_string(),
            keywords: [
                "event", "conference", "wedding", "party", "meetup", "workshop", "festival", "seminar", "summit",
            ]
            .map(String::from)
            .to_vec(),
            tasks: vec![
                task("Set budget and goals", Priority::High, "Audience, headcount and spending limits"),
                task("Book venue", Priority::High, "Shortlist, visit and sign the venue contract")
                    .with_warning("Popular venues are often booked months ahead"),
                task("Arrange vendors", Priority::Medium, "Catering, AV, decoration and transport"),
                task("Promote and send invitations", Priority::Medium, "Announcements, invitations and RSVPs"),
                task("Run the event", Priority::High, "Day-of coordination and contingency handling"),
                task("Follow up with attendees", Priority::Low, "Thank-you notes, survey and wrap-up report"),
            ],
        },
        Template {
            name: "general".to_string(),
            keywords: Vec::new(),
            tasks: vec![
                task("Define requirements", Priority::High, "Clarify goals, scope and success criteria"),
                task("Create project plan", Priority::High, "Break down the work, estimate and sequence it"),
                task("Secure resources", Priority::Medium, "Confirm budget, people and tools")
                    .with_warning("Resource availability may delay the start of execution"),
                task("Execute core work", Priority::Medium, "Carry out the main deliverables"),
                task("Review and close out", Priority::Low, "Check results against goals and hand over"),
            ],
        },
    ]
}
