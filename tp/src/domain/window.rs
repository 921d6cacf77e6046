//! DateWindow - a validated calendar range
//!
//! Governs both allocation (the project window) and display (the chart
//! window). Dates are calendar days; times of day never enter the window.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors constructing a window or parsing its dates
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("Window end {end} is before start {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// A `[start, end]` calendar range with `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "WindowSpan")]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct WindowSpan {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<WindowSpan> for DateWindow {
    type Error = WindowError;

    fn try_from(span: WindowSpan) -> Result<Self, Self::Error> {
        Self::new(span.start, span.end)
    }
}

impl DateWindow {
    /// Create a window, rejecting `end < start`
    ///
    /// `start == end` is a valid zero-duration window.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, WindowError> {
        if end < start {
            debug!(%start, %end, "DateWindow::new: end before start");
            return Err(WindowError::EndBeforeStart { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse a window from two ISO `YYYY-MM-DD` strings
    pub fn parse(start: &str, end: &str) -> Result<Self, WindowError> {
        Self::new(parse_iso_date(start)?, parse_iso_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whole days between start and end
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Span in milliseconds, the unit the layout engine divides by
    pub fn duration_ms(&self) -> i64 {
        (self.end - self.start).num_milliseconds()
    }

    /// Smallest window covering every `(start, end)` pair
    ///
    /// Pairs with `end < start` are skipped. Returns `None` if nothing is left.
    pub fn enclosing<I>(ranges: I) -> Option<Self>
    where
        I: IntoIterator<Item = (NaiveDate, NaiveDate)>,
    {
        ranges
            .into_iter()
            .filter(|(s, e)| s <= e)
            .fold(None, |acc: Option<Self>, (s, e)| match acc {
                None => Some(Self { start: s, end: e }),
                Some(w) => Some(Self {
                    start: w.start.min(s),
                    end: w.end.max(e),
                }),
            })
    }
}

impl std::fmt::Display for DateWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Add whole days to a date, saturating at the calendar limits
pub(crate) fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let saturated = if days >= 0 { NaiveDate::MAX } else { NaiveDate::MIN };
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(saturated)
}

/// Parse an ISO date
///
/// Accepts `YYYY-MM-DD` and also full timestamps (RFC 3339 or naive
/// `YYYY-MM-DDTHH:MM:SS`), keeping only the calendar date.
pub fn parse_iso_date(value: &str) -> Result<NaiveDate, WindowError> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }
    debug!(%value, "parse_iso_date: unparseable");
    Err(WindowError::InvalidDate(value.to_string()))
}

/// Parse an ISO timestamp, treating a bare date as midnight
pub fn parse_iso_datetime(value: &str) -> Result<NaiveDateTime, WindowError> {
    let trimmed = value.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_utc());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| WindowError::InvalidDate(value.to_string()))
}
