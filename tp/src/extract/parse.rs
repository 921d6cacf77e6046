//! Locating and validating the task JSON in a model reply
//!
//! The reply is untrusted text. It may be bare JSON, JSON inside a fenced
//! code block, or JSON surrounded by prose. Whatever is found is checked
//! against the expected shape before anything becomes a `TaskSpec`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use super::extractor::ExtractError;
use crate::domain::{DateWindow, Priority, TaskSpec, parse_iso_date};

// Literal pattern; compiled by test_fence_pattern_compiles
static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z]*[ \t]*\r?\n?([\s\S]*?)```").expect("fence pattern is valid"));

/// Result of validating a reply
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTasks {
    pub tasks: Vec<TaskSpec>,
    /// Entries dropped for lacking a usable title or not being objects
    pub skipped: usize,
}

/// One task as the model may send it; every field is optional here
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTask {
    #[serde(default, deserialize_with = "lenient_string")]
    title: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    description: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    priority: Option<String>,

    #[serde(default, alias = "warning_text", alias = "warning", deserialize_with = "lenient_string")]
    warning_text: Option<String>,

    #[serde(default, alias = "start_date", deserialize_with = "lenient_string")]
    start_date: Option<String>,

    #[serde(default, alias = "end_date", deserialize_with = "lenient_string")]
    end_date: Option<String>,
}

/// Keep strings, drop anything else (numbers, nulls, objects) as absent
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

impl RawTask {
    fn into_spec(self) -> Option<TaskSpec> {
        let title = self.title?;
        let mut spec = TaskSpec::new(title, Priority::normalize(self.priority.as_deref()));
        spec.description = self.description;
        spec.warning_text = self.warning_text;
        spec.suggested = suggested_window(self.start_date.as_deref(), self.end_date.as_deref());
        Some(spec)
    }
}

/// Both dates must parse and be in order, otherwise the hint is dropped
fn suggested_window(start: Option<&str>, end: Option<&str>) -> Option<DateWindow> {
    let start = parse_iso_date(start?).ok()?;
    let end = parse_iso_date(end?).ok()?;
    DateWindow::new(start, end).ok()
}

/// Candidate JSON snippets in the order they should be tried
///
/// 1. the whole reply, if it starts with `{`
/// 2. each fenced code block
/// 3. the span from the first `{` to the last `}`
pub fn locate_json(text: &str) -> Vec<&str> {
    let trimmed = text.trim();
    let mut candidates = Vec::new();

    if trimmed.starts_with('{') {
        candidates.push(trimmed);
    }

    for caps in FENCED_BLOCK.captures_iter(trimmed) {
        if let Some(body) = caps.get(1) {
            let body = body.as_str().trim();
            if body.starts_with('{') {
                candidates.push(body);
            }
        }
    }

    if let (Some(open), Some(close)) = (trimmed.find('{'), trimmed.rfind('}'))
        && open < close
    {
        let span = &trimmed[open..=close];
        if !candidates.contains(&span) {
            candidates.push(span);
        }
    }

    debug!(candidate_count = candidates.len(), "locate_json: done");
    candidates
}

/// Parse a model reply into validated task specs
pub fn parse_tasks(text: &str) -> Result<ParsedTasks, ExtractError> {
    let candidates = locate_json(text);
    if candidates.is_empty() {
        return Err(ExtractError::NoJson);
    }

    let mut last_error = None;
    let mut root = None;
    for candidate in candidates {
        match serde_json::from_str::<serde_json::Value>(candidate) {
            Ok(value) if value.is_object() => {
                root = Some(value);
                break;
            }
            Ok(_) => {
                debug!("parse_tasks: candidate is valid JSON but not an object");
            }
            Err(e) => {
                debug!(error = %e, "parse_tasks: candidate did not parse");
                last_error = Some(e.to_string());
            }
        }
    }

    let root = root.ok_or_else(|| ExtractError::MalformedJson(last_error.unwrap_or_else(|| "no JSON object".into())))?;

    let entries = match root.get("tasks") {
        Some(serde_json::Value::Array(entries)) => entries,
        _ => return Err(ExtractError::MissingTasks),
    };

    let mut tasks = Vec::with_capacity(entries.len());
    let mut skipped = 0;
    for (idx, entry) in entries.iter().enumerate() {
        let spec = serde_json::from_value::<RawTask>(entry.clone())
            .ok()
            .and_then(RawTask::into_spec);
        match spec {
            Some(spec) => tasks.push(spec),
            None => {
                warn!(idx, "parse_tasks: dropping task without a usable title");
                skipped += 1;
            }
        }
    }

    if tasks.is_empty() {
        return Err(ExtractError::NoValidTasks { skipped });
    }

    Ok(ParsedTasks { tasks, skipped })
}
