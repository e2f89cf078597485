// 📜 Logging setup
//
// RUST_LOG overrides the default level. The terminal UI owns stdout, so it
// logs to a file instead.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "financepro.log";

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}

/// `<dir>/financepro.log`, or the same name under the temp dir when `dir`
/// is not writable
fn open_log_file(dir: &Path) -> Result<(File, PathBuf)> {
    let primary = dir.join(LOG_FILE_NAME);
    match open_append(&primary) {
        Ok(file) => Ok((file, primary)),
        Err(primary_err) => {
            let fallback = env::temp_dir().join(LOG_FILE_NAME);
            let file = open_append(&fallback).with_context(|| primary_err.to_string())?;
            Ok((file, fallback))
        }
    }
}

pub fn init_stdout(default_level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(default_level))
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!(e))
}

/// Append logs to `<dir>/financepro.log`; returns the file actually used
pub fn init_file(dir: &Path, default_level: &str) -> Result<PathBuf> {
    let (file, path) = open_log_file(dir)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter(default_level))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow!(e))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_file_in_export_dir() {
        let dir = TempDir::new().unwrap();
        let (_file, path) = open_log_file(dir.path()).unwrap();

        assert_eq!(path, dir.path().join(LOG_FILE_NAME));
        assert!(path.exists());
    }

    #[test]
    fn test_missing_export_dir_falls_back_to_temp() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("not-created");

        let (_file, path) = open_log_file(&missing).unwrap();

        assert_eq!(path, env::temp_dir().join(LOG_FILE_NAME));
        assert!(!missing.exists());

        println!("✅ Log fallback test passed");
    }
}
