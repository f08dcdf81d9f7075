//! Loading and persisting the sync history ledger.
//!
//! The ledger is a single JSON document. Persistence is one whole-file
//! overwrite performed after the full batch completes, so a fatal error
//! earlier in the run never leaves partially-updated state on disk.

use crate::error::Result;
use crate::models::SyncHistory;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument};

/// Load the sync history from `path`.
///
/// A missing file yields an empty default ledger. Fields absent from an
/// existing document fall back to their serde defaults.
#[instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub async fn load(path: &Path) -> Result<SyncHistory> {
    if !path.exists() {
        debug!("No sync history file; starting with an empty ledger");
        return Ok(SyncHistory::default());
    }
    let raw = fs::read_to_string(path).await?;
    let history: SyncHistory = serde_json::from_str(&raw)?;
    debug!(
        synced_urls = history.synced_urls.len(),
        "Loaded sync history"
    );
    Ok(history)
}

/// Persist the sync history to `path` as pretty-printed JSON.
///
/// The whole file is overwritten in place.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn save(path: &Path, history: &SyncHistory) -> Result<()> {
    let json = serde_json::to_string_pretty(history)?;
    fs::write(path, json).await?;
    info!(
        synced_urls = history.synced_urls.len(),
        "Wrote sync history"
    );
    Ok(())
}
