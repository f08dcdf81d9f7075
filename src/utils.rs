//! Small helpers shared across the pipeline: character-safe truncation and
//! report file resolution.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Truncate a string to its first `max` characters.
///
/// Truncation is character-based rather than byte-based so multibyte text
/// (digest reports routinely contain non-ASCII titles and summaries) is never
/// split mid-codepoint.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_chars("short", 100), "short");
/// assert_eq!(truncate_chars("héllo", 2), "hé");
/// ```
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and a count of
/// the dropped characters appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let total = s.chars().count();
    if total <= max {
        s.to_string()
    } else {
        format!("{}…(+{} chars)", truncate_chars(s, max), total - max)
    }
}

/// Locate the report file for a given date.
///
/// Tries the known report filenames in order:
/// `{date}-news-report.md`, then `{date}-full.md`.
///
/// # Errors
///
/// Returns [`Error::ReportNotFound`] listing every candidate path when none
/// of them exists.
pub fn resolve_report_path(report_dir: &Path, date: &str) -> Result<PathBuf> {
    let candidates = [
        report_dir.join(format!("{date}-news-report.md")),
        report_dir.join(format!("{date}-full.md")),
    ];
    for candidate in &candidates {
        if candidate.exists() {
            return Ok(candidate.clone());
        }
    }
    Err(Error::ReportNotFound {
        date: date.to_string(),
        tried: candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
    })
}
