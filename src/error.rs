//! Error taxonomy for the sync pipeline.
//!
//! Fatal errors ([`Error::Config`], [`Error::ReportNotFound`],
//! [`Error::DatabaseAccess`]) abort the run before any page is written.
//! Per-record write failures are not represented here; they are collected
//! into the run's failure list so one bad record never aborts the batch.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Required configuration is missing (API credential or database id).
    #[error("missing configuration: {0}")]
    Config(String),

    /// No report file exists for the requested date.
    #[error("report not found for date {date} (tried: {})", .tried.join(", "))]
    ReportNotFound { date: String, tried: Vec<String> },

    /// The pre-flight probe failed or the database id is not accessible.
    #[error("database access: {0}")]
    DatabaseAccess(String),

    /// The request never completed (connect, timeout, or mid-body failure).
    #[error("network error: {0}")]
    Network(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_not_found_lists_candidates() {
        let e = Error::ReportNotFound {
            date: "2025-11-03".to_string(),
            tried: vec![
                "output_info/2025-11-03-news-report.md".to_string(),
                "output_info/2025-11-03-full.md".to_string(),
            ],
        };
        let msg = e.to_string();
        assert!(msg.contains("2025-11-03"));
        assert!(msg.contains("news-report.md"));
        assert!(msg.contains("full.md"));
    }

    #[test]
    fn test_io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let e: Error = io.into();
        assert!(matches!(e, Error::Io(_)));
    }
}
