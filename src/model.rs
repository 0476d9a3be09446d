// File: src/model.rs
// Data model: raw task records as the provider returns them, enriched items
// produced by the worker pool, and the minimal durable tracker entry.
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// Fixed display/storage format for completion dates ("DD-MM-YYYY").
/// Tracker date keys use this format and are only ever compared after
/// parsing back to a calendar date.
pub const DATE_FMT: &str = "%d-%m-%Y";

/// Sentinel shown for tasks that have not been completed yet.
pub const NOT_COMPLETE: &str = "Not complete";

/// A task exactly as the external task provider reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTaskItem {
    pub title: String,
    pub status: String,
    /// RFC 3339 completion timestamp; absent or empty means the task is
    /// not complete.
    pub completed_at: Option<String>,
}

impl RawTaskItem {
    pub fn is_completed(&self) -> bool {
        self.completed_at.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Truncates the provider's completion timestamp to a calendar day.
    /// Returns None for missing, empty, or unparsable timestamps.
    pub fn completion_day(&self) -> Option<NaiveDate> {
        let raw = self.completed_at.as_deref()?;
        if raw.is_empty() {
            return None;
        }
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.date_naive())
    }
}

/// Category/difficulty label returned by a classification provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: String,
    pub difficulty: String,
}

/// A raw task plus the normalized completion day and (when classification
/// succeeded) its label. `classification == None` for incomplete tasks and
/// for per-item classification failures; such items never reach the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedTaskItem {
    pub title: String,
    pub status: String,
    pub completed: Option<NaiveDate>,
    pub classification: Option<Classification>,
}

impl EnrichedTaskItem {
    /// Completion day in the fixed display format, or the sentinel.
    pub fn completed_label(&self) -> String {
        match self.completed {
            Some(d) => d.format(DATE_FMT).to_string(),
            None => NOT_COMPLETE.to_string(),
        }
    }
}

/// The durable record stored per (list, date). Two entries with the same
/// title in the same bucket are the same logical record; equality for dedup
/// purposes is by title only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerEntry {
    pub title: String,
    pub category: String,
    pub difficulty: String,
}

/// Parse a tracker date key back to a calendar date.
pub fn parse_tracker_date(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DATE_FMT).ok()
}
