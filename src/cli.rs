//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the digest sync tool.
///
/// # Examples
///
/// ```sh
/// # Sync today's report
/// digest_sync
///
/// # Sync a specific date
/// digest_sync 2025-11-03
///
/// # Re-submit everything for a date, ignoring the sync history
/// digest_sync --force 2025-11-03
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Report date to sync (YYYY-MM-DD); defaults to today
    pub date: Option<String>,

    /// Submit every parsed article even when already recorded in the sync
    /// history (may create duplicate pages downstream)
    #[arg(short, long)]
    pub force: bool,

    /// Directory containing generated digest reports
    #[arg(long, default_value = "output_info")]
    pub report_dir: PathBuf,

    /// Path of the sync history ledger
    #[arg(long, default_value = "sync-history.json")]
    pub history_file: PathBuf,

    /// JSON config file consulted for the database id
    #[arg(long, default_value = "config.json")]
    pub config_file: PathBuf,

    /// Notion database id (overrides the config file)
    #[arg(long, env = "NOTION_DATABASE_ID")]
    pub database_id: Option<String>,
}
