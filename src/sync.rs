//! Sync engine: delta computation, bounded-retry submission, and history
//! bookkeeping.
//!
//! Records are synced one at a time in document order. The write API is
//! rate-sensitive, so serial execution is the safe default.
//!
//! # Retry asymmetry
//!
//! A transport failure (the request never completed) is retried up to the
//! fixed attempt budget with a fixed delay between attempts. A completed
//! response with a non-200 status is never retried: it is recorded as that
//! record's failure immediately. The batch always continues past a failed
//! record.
//!
//! Per-record lifecycle: pending, then up to three attempts, then either
//! succeeded or failed. A failed record is never revisited within the run.

use crate::error::Result;
use crate::models::{ArticleRecord, FailureRecord, SyncHistory, SyncOutcome};
use crate::notion::NotionApi;
use crate::utils::{truncate_chars, truncate_for_log};
use chrono::Local;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// Attempt budget per record, transport failures only.
pub const MAX_ATTEMPTS: usize = 3;
/// Fixed delay between attempts. Not exponential.
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

const FAILURE_MESSAGE_LIMIT: usize = 100;

/// Result of one sync run.
#[derive(Debug)]
pub struct SyncReport {
    /// Per-record outcomes in submission order.
    pub outcomes: Vec<SyncOutcome>,
    /// Number of records actually submitted this run.
    pub attempted: usize,
    /// Number of records skipped as already synced.
    pub skipped: usize,
}

impl SyncReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SyncOutcome::Synced { .. }))
            .count()
    }

    pub fn failures(&self) -> Vec<&FailureRecord> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                SyncOutcome::Failed(failure) => Some(failure),
                SyncOutcome::Synced { .. } => None,
            })
            .collect()
    }
}

/// Run a full sync pass over the parsed records.
///
/// Pre-flight: the target database is probed first; a failed probe aborts
/// the run before any write. The delta against `history.synced_urls` is then
/// submitted record by record. On HTTP 200 the record's url enters the
/// synced set; any other terminal outcome lands in the failure list and the
/// batch moves on.
///
/// When at least one record was submitted, `history` is updated in place:
/// `total_synced` becomes the size of the synced set, the skipped count is
/// added to `total_skipped`, and `last_sync` is stamped. A run with nothing
/// to submit leaves `history` untouched. The caller persists the file.
#[instrument(level = "info", skip_all, fields(records = articles.len(), force))]
pub async fn run<A: NotionApi>(
    api: &A,
    articles: &[ArticleRecord],
    history: &mut SyncHistory,
    report_date: &str,
    force: bool,
) -> Result<SyncReport> {
    let database_title = api.verify_database().await?;
    info!(database = %database_title, "Database probe succeeded");

    let new_articles: Vec<&ArticleRecord> = if force {
        warn!("Force mode: submitting every record; duplicates may be created downstream");
        articles.iter().collect()
    } else {
        articles
            .iter()
            .filter(|a| !history.synced_urls.contains(&a.url))
            .collect()
    };
    let skipped = articles.len() - new_articles.len();
    info!(new = new_articles.len(), skipped, "Computed sync delta");

    if new_articles.is_empty() {
        return Ok(SyncReport {
            outcomes: Vec::new(),
            attempted: 0,
            skipped,
        });
    }

    let total = new_articles.len();
    let mut outcomes = Vec::with_capacity(total);
    for (i, article) in new_articles.iter().enumerate() {
        info!(
            index = i + 1,
            total,
            title = %truncate_for_log(&article.title, 50),
            "Syncing record"
        );
        let outcome = submit_with_retry(api, article, report_date).await;
        match &outcome {
            SyncOutcome::Synced { url } => {
                // An empty url cannot serve as an idempotency key; such
                // records stay out of the ledger and are re-submitted on
                // every run.
                if !url.is_empty() {
                    history.synced_urls.insert(url.clone());
                }
                info!(index = i + 1, "Record synced");
            }
            SyncOutcome::Failed(failure) => {
                error!(
                    index = i + 1,
                    code = %failure.code,
                    title = %truncate_for_log(&failure.title, 50),
                    "Record failed; continuing with the batch"
                );
            }
        }
        outcomes.push(outcome);
    }

    history.stats.total_synced = history.synced_urls.len() as u64;
    history.stats.total_skipped += skipped as u64;
    history.last_sync = Some(Local::now().to_rfc3339());

    Ok(SyncReport {
        outcomes,
        attempted: total,
        skipped,
    })
}

/// Submit one record, retrying transport failures within the attempt budget.
async fn submit_with_retry<A: NotionApi>(
    api: &A,
    article: &ArticleRecord,
    report_date: &str,
) -> SyncOutcome {
    let mut attempt = 0;
    let result = loop {
        attempt += 1;
        match api.create_page(article, report_date).await {
            Ok(response) => break Ok(response),
            Err(e) => {
                if attempt >= MAX_ATTEMPTS {
                    break Err(e);
                }
                warn!(
                    attempt,
                    max = MAX_ATTEMPTS,
                    error = %e,
                    "Transport failure; backing off before retrying"
                );
                sleep(RETRY_DELAY).await;
            }
        }
    };

    match result {
        Ok(response) if response.status == 200 => SyncOutcome::Synced {
            url: article.url.clone(),
        },
        Ok(response) => SyncOutcome::Failed(FailureRecord {
            title: article.title.clone(),
            code: response.status.to_string(),
            message: truncate_chars(&response.body, FAILURE_MESSAGE_LIMIT),
        }),
        Err(e) => SyncOutcome::Failed(FailureRecord {
            title: article.title.clone(),
            code: "error".to_string(),
            message: truncate_chars(&e.to_string(), FAILURE_MESSAGE_LIMIT),
        }),
    }
}
