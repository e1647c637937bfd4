//! Tracing bootstrap.
//!
//! The TUI owns the terminal, so in that mode logs go to a file; headless
//! runs log to stderr.

use std::env;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Where log lines end up.
pub enum LogTarget<'a> {
    /// Append to `scrollfeed.log` inside this directory.
    File(&'a Path),
    Stderr,
}

/// Initialize the global tracing subscriber.
///
/// Filter precedence:
/// 1) `RUST_LOG`
/// 2) `SCROLLFEED_LOG`
/// 3) `fallback` (the config file's `log_level`)
///
/// Returns the log file path when logging to a file.
pub fn init(fallback: &str, target: LogTarget<'_>) -> Result<Option<PathBuf>> {
    let filter = filter_from_env(fallback);

    match target {
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_target(true)
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
            Ok(None)
        }
        LogTarget::File(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
            let path = dir.join("scrollfeed.log");
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("opening log file {}", path.display()))?;

            let _ = tracing_subscriber::fmt()
                .with_target(true)
                .with_ansi(false)
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .try_init();
            Ok(Some(path))
        }
    }
}

fn filter_from_env(fallback: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    if let Some(filter) = env::var("SCROLLFEED_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
    {
        return filter;
    }

    EnvFilter::try_new(fallback).unwrap_or_else(|_| EnvFilter::new("info"))
}
