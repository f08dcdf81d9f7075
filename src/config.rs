//! Startup configuration.
//!
//! All configuration is resolved once into an explicit [`Config`] struct and
//! passed down from `main`; nothing below this layer reads ambient process
//! state.
//!
//! # Resolution order
//!
//! - API key: process environment, then a project-level `.env`, then the
//!   user-level `~/.digest-sync/.env`. The first non-empty value wins.
//!   `.env` files are read in place without mutating the process
//!   environment.
//! - Database id: the `--database-id` flag (or `NOTION_DATABASE_ID` in the
//!   process environment, via clap), then the same `.env` layering, then the
//!   `database_id` field of the JSON config file.
//!
//! Missing either value is a fatal configuration error reported before any
//! work happens.

use crate::cli::Cli;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const API_KEY_VAR: &str = "NOTION_API_KEY";
pub const DATABASE_ID_VAR: &str = "NOTION_DATABASE_ID";

/// Everything the rest of the pipeline needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub database_id: String,
    pub report_dir: PathBuf,
    pub history_path: PathBuf,
}

/// On-disk JSON config file; only the database id is read from it.
#[derive(Debug, Deserialize)]
struct FileConfig {
    #[serde(default)]
    database_id: Option<String>,
}

impl Config {
    /// Build the configuration from CLI arguments, the process environment,
    /// the layered `.env` files, and the JSON config file.
    pub fn resolve(cli: &Cli) -> Result<Self> {
        Self::resolve_with_env_files(cli, &default_env_files())
    }

    fn resolve_with_env_files(cli: &Cli, env_files: &[PathBuf]) -> Result<Self> {
        let api_key = layered_env(API_KEY_VAR, env_files).ok_or_else(|| {
            let checked = env_files
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            Error::Config(format!(
                "{API_KEY_VAR} is not set (checked the process environment and: {checked})"
            ))
        })?;

        let database_id = cli
            .database_id
            .clone()
            .filter(|id| !id.is_empty())
            .or_else(|| layered_env(DATABASE_ID_VAR, env_files))
            .or_else(|| file_database_id(&cli.config_file))
            .ok_or_else(|| {
                Error::Config(format!(
                    "no database id: set {DATABASE_ID_VAR} or add database_id to {}",
                    cli.config_file.display()
                ))
            })?;

        Ok(Self {
            api_key,
            database_id,
            report_dir: cli.report_dir.clone(),
            history_path: cli.history_file.clone(),
        })
    }
}

/// The `.env` files consulted after the process environment, in priority
/// order: project-level first, then user-level.
fn default_env_files() -> Vec<PathBuf> {
    let mut files = vec![PathBuf::from(".env")];
    if let Some(home) = dirs::home_dir() {
        files.push(home.join(".digest-sync").join(".env"));
    }
    files
}

/// Look a key up in the process environment, then in each `.env` file in
/// order. Empty values are treated as unset.
fn layered_env(key: &str, env_files: &[PathBuf]) -> Option<String> {
    if let Ok(value) = std::env::var(key) {
        if !value.is_empty() {
            return Some(value);
        }
    }
    env_files.iter().find_map(|file| env_file_value(file, key))
}

fn env_file_value(path: &Path, key: &str) -> Option<String> {
    if !path.exists() {
        return None;
    }
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Unreadable env file; skipping");
            return None;
        }
    };
    for entry in entries {
        match entry {
            Ok((k, v)) if k == key && !v.is_empty() => return Some(v),
            Ok(_) => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Malformed env file; skipping");
                return None;
            }
        }
    }
    None
}

/// Read the database id out of the JSON config file, when present.
fn file_database_id(path: &Path) -> Option<String> {
    if !path.exists() {
        debug!(path = %path.display(), "No config file");
        return None;
    }
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Unreadable config file; skipping");
            return None;
        }
    };
    match serde_json::from_str::<FileConfig>(&raw) {
        Ok(parsed) => parsed.database_id.filter(|id| !id.is_empty()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Malformed config file; skipping");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn write_env(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_env_file_value() {
        let dir = tempfile::tempdir().unwrap();
        let env = write_env(dir.path(), ".env", "SOME_TEST_TOKEN=secret-123\n");
        assert_eq!(
            env_file_value(&env, "SOME_TEST_TOKEN"),
            Some("secret-123".to_string())
        );
        assert_eq!(env_file_value(&env, "MISSING"), None);
    }

    #[test]
    fn test_layered_env_first_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let project = write_env(dir.path(), "project.env", "DIGEST_TEST_LAYER=project\n");
        let user = write_env(dir.path(), "user.env", "DIGEST_TEST_LAYER=user\n");
        let value = layered_env("DIGEST_TEST_LAYER", &[project, user]);
        assert_eq!(value, Some("project".to_string()));
    }

    #[test]
    fn test_layered_env_falls_through_to_later_file() {
        let dir = tempfile::tempdir().unwrap();
        let project = write_env(dir.path(), "project.env", "OTHER=x\n");
        let user = write_env(dir.path(), "user.env", "DIGEST_TEST_FALLBACK=user\n");
        let value = layered_env("DIGEST_TEST_FALLBACK", &[project, user]);
        assert_eq!(value, Some("user".to_string()));
    }

    #[test]
    fn test_file_database_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"database_id": "db-from-file"}"#).unwrap();
        assert_eq!(file_database_id(&path), Some("db-from-file".to_string()));
    }

    #[test]
    fn test_file_database_id_missing_or_malformed() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(file_database_id(&dir.path().join("absent.json")), None);

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        assert_eq!(file_database_id(&bad), None);
    }

    #[test]
    fn test_resolve_reads_key_and_id_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let env = write_env(dir.path(), ".env", "NOTION_API_KEY=ntn-secret\n");
        let config_file = dir.path().join("config.json");
        std::fs::write(&config_file, r#"{"database_id": "db-1"}"#).unwrap();

        let cli = Cli::parse_from([
            "digest_sync",
            "--config-file",
            config_file.to_str().unwrap(),
            "--database-id",
            "",
        ]);
        let config = Config::resolve_with_env_files(&cli, &[env]).unwrap();
        assert_eq!(config.api_key, "ntn-secret");
        assert_eq!(config.database_id, "db-1");
    }

    #[test]
    fn test_resolve_flag_beats_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let env = write_env(dir.path(), ".env", "NOTION_API_KEY=ntn-secret\n");
        let config_file = dir.path().join("config.json");
        std::fs::write(&config_file, r#"{"database_id": "db-file"}"#).unwrap();

        let cli = Cli::parse_from([
            "digest_sync",
            "--config-file",
            config_file.to_str().unwrap(),
            "--database-id",
            "db-flag",
        ]);
        let config = Config::resolve_with_env_files(&cli, &[env]).unwrap();
        assert_eq!(config.database_id, "db-flag");
    }

    #[test]
    fn test_resolve_missing_api_key_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let empty_env = write_env(dir.path(), ".env", "UNRELATED=1\n");

        let cli = Cli::parse_from(["digest_sync", "--database-id", "db-1"]);
        let err = Config::resolve_with_env_files(&cli, &[empty_env]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains(API_KEY_VAR));
    }

    #[test]
    fn test_resolve_missing_database_id_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let env = write_env(dir.path(), ".env", "NOTION_API_KEY=ntn-secret\n");
        let absent_config = dir.path().join("absent-config.json");

        let cli = Cli::parse_from([
            "digest_sync",
            "--config-file",
            absent_config.to_str().unwrap(),
            "--database-id",
            "",
        ]);
        let err = Config::resolve_with_env_files(&cli, &[env]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
