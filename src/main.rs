//! # Digest Sync
//!
//! Syncs parsed news digest reports into a Notion database. A digest report
//! is a Markdown document of numbered article sections; each section becomes
//! one database page, deduplicated against a durable ledger of
//! previously-pushed article URLs.
//!
//! ## Usage
//!
//! ```sh
//! digest_sync              # sync today's report
//! digest_sync 2025-11-03   # sync a specific date
//! digest_sync -f           # re-submit everything, ignoring the ledger
//! ```
//!
//! ## Architecture
//!
//! The application follows a short pipeline:
//! 1. **Configure**: resolve the API credential and database id once into an
//!    explicit config struct (environment, `.env` layers, config file)
//! 2. **Locate & parse**: find the report file for the requested date and
//!    parse it into article records
//! 3. **Probe**: confirm the target database is reachable before any write
//! 4. **Sync**: submit new records one at a time with bounded retries,
//!    collecting per-record outcomes
//! 5. **Persist**: overwrite the sync history ledger after the batch

use chrono::Local;
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod config;
mod error;
mod history;
mod models;
mod notion;
mod parser;
mod sync;
mod utils;

use cli::Cli;
use config::Config;
use error::Result;
use notion::NotionClient;
use utils::{resolve_report_path, truncate_for_log};

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Sync aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let start_time = std::time::Instant::now();
    info!("digest_sync starting up");

    let args = Cli::parse();
    let config = Config::resolve(&args)?;

    let report_date = args
        .date
        .clone()
        .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string());
    let report_path = resolve_report_path(&config.report_dir, &report_date)?;
    info!(path = %report_path.display(), date = %report_date, "Reading report");

    let text = tokio::fs::read_to_string(&report_path).await?;
    let articles = parser::parse_report(&text);
    info!(count = articles.len(), "Parsed article records");

    let mut history = history::load(&config.history_path).await?;
    let client = NotionClient::new(config.api_key.clone(), config.database_id.clone())?;

    let report = sync::run(&client, &articles, &mut history, &report_date, args.force).await?;

    if report.attempted == 0 {
        info!(skipped = report.skipped, "All articles already synced; nothing to do");
        if !args.force {
            info!("Pass --force to re-submit previously synced articles");
        }
        return Ok(());
    }

    history::save(&config.history_path, &history).await?;

    let succeeded = report.succeeded();
    let failures = report.failures();
    info!(
        succeeded,
        failed = failures.len(),
        skipped = report.skipped,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "Sync run complete"
    );
    for failure in failures {
        warn!(
            title = %truncate_for_log(&failure.title, 50),
            code = %failure.code,
            message = %failure.message,
            "Article was not synced"
        );
    }

    Ok(())
}
