//! Data models for parsed digest entries and sync bookkeeping.
//!
//! This module defines the core data structures used throughout the
//! application:
//! - [`ArticleRecord`]: one digest entry extracted from a report section
//! - [`SyncHistory`]: the durable idempotency ledger of already-pushed URLs
//! - [`SyncOutcome`] / [`FailureRecord`]: per-record results of a sync run
//!
//! The history document is persisted as JSON; every field carries a serde
//! default so ledgers written by older versions (or hand-edited ones with
//! missing fields) still load.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One parsed digest entry extracted from a report section.
///
/// The `url` is the dedup key against [`SyncHistory::synced_urls`]. It may be
/// empty when the section carried no original-link line; such a record never
/// enters the synced set and is treated as new on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// 1-based rank taken verbatim from the section heading. May be
    /// non-contiguous or duplicated across sections; not corrected.
    pub rank: i64,
    /// The section heading text after the rank number.
    pub title: String,
    /// Summary text, empty when the summary line is absent.
    pub summary: String,
    /// Key points as a newline-joined list, renumbered 1..N.
    pub key_points: String,
    /// The original-article link target; empty when absent. Never validated.
    pub url: String,
    /// Source label, `"Other"` when absent.
    pub source: String,
    /// Backtick-quoted keyword tokens in document order, at most five.
    pub keywords: Vec<String>,
    /// Star rating as a string in `"1"`..`"5"`, `"3"` when absent.
    pub score: String,
}

/// Durable idempotency ledger of previously-pushed record identifiers.
///
/// Loaded once at process start (empty defaults when the file is absent),
/// mutated in memory as records succeed, and persisted as a single
/// whole-file overwrite after the batch completes. Owned exclusively by one
/// sync run; concurrent runs are not supported.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncHistory {
    #[serde(default)]
    pub synced_urls: BTreeSet<String>,
    #[serde(default)]
    pub stats: SyncStats,
    #[serde(default)]
    pub last_sync: Option<String>,
}

/// Running totals carried across sync runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStats {
    #[serde(default)]
    pub total_synced: u64,
    #[serde(default)]
    pub total_skipped: u64,
}

/// Terminal result for a single record within a sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The page was created (HTTP 200) and the URL entered the synced set.
    Synced { url: String },
    /// The record terminally failed; the batch continued past it.
    Failed(FailureRecord),
}

/// Details of one failed record: the title, a status code or exception tag,
/// and the response or error message truncated to its first 100 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub title: String,
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_defaults_when_fields_missing() {
        // A ledger written before stats existed still loads.
        let json = r#"{"synced_urls": ["http://a", "http://b"]}"#;
        let history: SyncHistory = serde_json::from_str(json).unwrap();
        assert_eq!(history.synced_urls.len(), 2);
        assert_eq!(history.stats.total_synced, 0);
        assert_eq!(history.stats.total_skipped, 0);
        assert!(history.last_sync.is_none());
    }

    #[test]
    fn test_history_empty_document() {
        let history: SyncHistory = serde_json::from_str("{}").unwrap();
        assert!(history.synced_urls.is_empty());
        assert!(history.last_sync.is_none());
    }

    #[test]
    fn test_history_round_trip() {
        let mut history = SyncHistory::default();
        history.synced_urls.insert("http://x".to_string());
        history.stats.total_synced = 1;
        history.last_sync = Some("2025-11-03T08:00:00+00:00".to_string());

        let json = serde_json::to_string_pretty(&history).unwrap();
        let back: SyncHistory = serde_json::from_str(&json).unwrap();
        assert!(back.synced_urls.contains("http://x"));
        assert_eq!(back.stats.total_synced, 1);
        assert_eq!(back.last_sync.as_deref(), Some("2025-11-03T08:00:00+00:00"));
    }

    #[test]
    fn test_article_record_serialization() {
        let record = ArticleRecord {
            rank: 1,
            title: "A".to_string(),
            summary: "s".to_string(),
            key_points: "1. p".to_string(),
            url: "http://x".to_string(),
            source: "HackerNews".to_string(),
            keywords: vec!["ai".to_string(), "llm".to_string()],
            score: "4".to_string(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: ArticleRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
