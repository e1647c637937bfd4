//! Configuration file handling.
//!
//! Settings come from a TOML file, by default
//! `<config_dir>/scrollfeed/config.toml`.  Every field has a default, so a
//! missing file or a partial file is fine.  Command-line flags are applied on
//! top in `main.rs`.
//!
//! ```toml
//! log_level = "debug"
//!
//! [source]
//! kind = "rss"
//! url = "https://feeds.bbci.co.uk/news/rss.xml"
//! page_size = 15
//!
//! [engine]
//! fetch_timeout_ms = 5000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;
use crate::error::ConfigError;
use crate::source::MockSourceConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Fallback log filter when no environment override is set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            source: SourceConfig::default(),
            engine: EngineSection::default(),
            ui: UiConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Mock,
    Rss,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_kind")]
    pub kind: SourceKind,
    /// Feed URL (rss only)
    #[serde(default = "default_url")]
    pub url: String,
    /// Label shown in the status bar
    #[serde(default = "default_label")]
    pub label: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Mock latency for the first page
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Mock latency for continuation pages
    #[serde(default = "default_more_delay_ms")]
    pub more_delay_ms: u64,
    /// Mock pages before exhaustion; unset means endless
    #[serde(default)]
    pub max_pages: Option<u32>,
    /// Mock failure probability (0.0-1.0)
    #[serde(default)]
    pub failure_rate: f64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: default_source_kind(),
            url: default_url(),
            label: default_label(),
            page_size: default_page_size(),
            initial_delay_ms: default_initial_delay_ms(),
            more_delay_ms: default_more_delay_ms(),
            max_pages: None,
            failure_rate: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSection {
    /// Per-fetch timeout; 0 disables it
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,
    /// Load more once the selection is this close to the last item
    #[serde(default = "default_prefetch_threshold")]
    pub prefetch_threshold: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate_ms(),
            prefetch_threshold: default_prefetch_threshold(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_source_kind() -> SourceKind {
    SourceKind::Mock
}

fn default_url() -> String {
    "https://feeds.bbci.co.uk/news/rss.xml".to_string()
}

fn default_label() -> String {
    "Feed".to_string()
}

fn default_page_size() -> usize {
    20
}

fn default_initial_delay_ms() -> u64 {
    1500
}

fn default_more_delay_ms() -> u64 {
    2000
}

fn default_fetch_timeout_ms() -> u64 {
    10_000
}

fn default_tick_rate_ms() -> u64 {
    100
}

fn default_prefetch_threshold() -> usize {
    3
}

impl AppConfig {
    /// `<config_dir>/scrollfeed/config.toml`, if the platform has a config
    /// directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scrollfeed").join("config.toml"))
    }

    /// Where the TUI writes its log file.
    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("scrollfeed")
    }

    /// Load from `path`, or from [`default_path`](Self::default_path).
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml_str(&text, &path)
    }

    /// Parse and validate TOML text.  `path` is only used in error messages.
    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.page_size == 0 {
            return Err(ConfigError::Invalid("source.page_size must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.source.failure_rate) {
            return Err(ConfigError::Invalid(
                "source.failure_rate must be between 0.0 and 1.0".into(),
            ));
        }
        if self.source.kind == SourceKind::Rss && self.source.url.trim().is_empty() {
            return Err(ConfigError::Invalid("source.url is required for rss".into()));
        }
        if self.ui.tick_rate_ms == 0 {
            return Err(ConfigError::Invalid("ui.tick_rate_ms must be at least 1".into()));
        }
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            fetch_timeout: match self.engine.fetch_timeout_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
        }
    }

    pub fn mock_config(&self) -> MockSourceConfig {
        MockSourceConfig {
            page_size: self.source.page_size,
            initial_delay: Duration::from_millis(self.source.initial_delay_ms),
            more_delay: Duration::from_millis(self.source.more_delay_ms),
            max_pages: self.source.max_pages,
            failure_rate: self.source.failure_rate,
        }
    }
}
