//! Priority levels and their scheduling weights

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Priority level for a planned task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Duration factor applied to a task's share of the window
    ///
    /// Medium deliberately carries the largest factor. Existing schedules
    /// depend on this ordering, see `test_medium_has_longest_factor`.
    pub fn duration_factor(self) -> f64 {
        match self {
            Self::High => 2.0,
            Self::Medium => 3.0,
            Self::Low => 1.5,
        }
    }

    /// Minimum nominal duration in days
    pub fn min_days(self) -> i64 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    /// Whether the next task must wait for this one to finish
    pub fn blocks_overlap(self) -> bool {
        self == Self::High
    }

    /// Normalize a free-form priority string, defaulting to Medium
    ///
    /// Accepts the three canonical names case-insensitively plus a few
    /// synonyms models tend to produce ("critical", "urgent", "normal", "minor").
    pub fn normalize(value: Option<&str>) -> Self {
        debug!(?value, "Priority::normalize: called");
        let Some(raw) = value else {
            return Self::default();
        };
        match raw.trim().to_lowercase().as_str() {
            "high" | "critical" | "urgent" => Self::High,
            "medium" | "normal" | "moderate" => Self::Medium,
            "low" | "minor" => Self::Low,
            other => {
                debug!(%other, "Priority::normalize: unrecognized, defaulting to medium");
                Self::default()
            }
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}
