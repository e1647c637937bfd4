//! Error types crossing the source/engine boundary and the config loader.
//!
//! [`FetchError`] is deliberately opaque to the engine: it is stored as
//! `last_error`, handed to observers, and otherwise never inspected.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Coarse classification of a fetch failure, for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// The source itself reported a failure (transport, parse, bad cursor).
    Source,
    /// The engine gave up waiting for the source.
    Timeout,
}

/// A failed page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?}: {reason}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    /// Human-readable reason, shown in the status bar.
    pub reason: String,
}

impl FetchError {
    /// Construct a source failure.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Source,
            reason: reason.into(),
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self {
            kind: FetchErrorKind::Timeout,
            reason: format!("fetch timed out after {} ms", after.as_millis()),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::new(format!("http: {err}"))
    }
}

impl From<rss::Error> for FetchError {
    fn from(err: rss::Error) -> Self {
        Self::new(format!("rss: {err}"))
    }
}

/// Errors raised while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}
