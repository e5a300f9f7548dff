//! Configuration module for FluxVis-RS
//!
//! This module handles the configuration surface of the sync service:
//! - Data-source connection parameters (URL, org, token, bucket, measurement)
//! - Sync behavior (start epoch, device-prefix filter, poll interval)
//!
//! # Config File Location
//!
//! Configuration is read from `config.toml` in the platform-appropriate
//! location:
//! - **Linux**: `~/.config/dev.fluxvis.fluxvis-rs/config.toml`
//! - **macOS**: `~/Library/Application Support/dev.fluxvis.fluxvis-rs/config.toml`
//! - **Windows**: `%APPDATA%\dev.fluxvis.fluxvis-rs\config.toml`
//!
//! # Environment Overrides
//!
//! Credentials are taken from the environment when present, overriding the
//! file: `INFLUX_URL`, `INFLUX_TOKEN`, `INFLUX_ORG`. This matches how the
//! deployment provisions secrets; tokens do not belong in the config file.
//!
//! # Example
//!
//! ```ignore
//! use fluxvis_rs::config::AppConfig;
//!
//! let config = AppConfig::load_or_default();
//! println!("polling {} every {:?}", config.source.bucket, config.sync.poll_interval());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{FluxVisError, Result, ResultExt};

/// Application identifier for config directories
pub const APP_ID: &str = "dev.fluxvis.fluxvis-rs";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Default poll interval in seconds
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Default timeout for fetch operations in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Default bucket holding the tracker measurement
pub const DEFAULT_BUCKET: &str = "dashboard-practise";

/// Default measurement name written by the decoder
pub const DEFAULT_MEASUREMENT: &str = "tracker_data";

/// Default start boundary for the initial fetch
pub const DEFAULT_START_TIME: &str = "2025-10-22T06:17:00Z";

/// Default device-prefix filter; empty string disables filtering
pub const DEFAULT_DEVICE_PREFIX: &str = "satellite";

/// Get the application config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the default config file path
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

fn default_start_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(DEFAULT_START_TIME)
        .expect("DEFAULT_START_TIME is valid RFC 3339")
        .with_timezone(&Utc)
}

// ==================== Source Config ====================

/// Data-source connection configuration (InfluxDB 2.x)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the InfluxDB instance (e.g. "http://localhost:8086")
    #[serde(default)]
    pub url: String,

    /// Organization name
    #[serde(default)]
    pub org: String,

    /// API token; normally provided via `INFLUX_TOKEN`
    #[serde(default)]
    pub token: String,

    /// Bucket holding the measurement
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Measurement name to filter on
    #[serde(default = "default_measurement")]
    pub measurement: String,

    /// Per-request timeout in seconds; a hanging source must not stall the poll cycle
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// Use the synthetic mock source instead of InfluxDB
    /// (only honored when built with the `mock-source` feature)
    #[serde(default)]
    pub use_mock: bool,
}

fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}

fn default_measurement() -> String {
    DEFAULT_MEASUREMENT.to_string()
}

fn default_fetch_timeout() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            org: String::new(),
            token: String::new(),
            bucket: default_bucket(),
            measurement: default_measurement(),
            timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            use_mock: false,
        }
    }
}

impl SourceConfig {
    /// Fetch timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// True when connection parameters are present
    pub fn has_credentials(&self) -> bool {
        !self.url.is_empty() && !self.org.is_empty() && !self.token.is_empty()
    }
}

// ==================== Sync Config ====================

/// Sync engine behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Fixed start boundary for the bootstrap fetch
    #[serde(default = "default_start_time")]
    pub start_time: DateTime<Utc>,

    /// Only devices whose identifier starts with this prefix are retained;
    /// empty string disables filtering
    #[serde(default = "default_device_prefix")]
    pub device_prefix: String,

    /// Poll interval in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_device_prefix() -> String {
    DEFAULT_DEVICE_PREFIX.to_string()
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            start_time: default_start_time(),
            device_prefix: default_device_prefix(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl SyncConfig {
    /// Poll interval as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

// ==================== App Config ====================

/// Full application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Data-source connection configuration
    #[serde(default)]
    pub source: SourceConfig,

    /// Sync behavior configuration
    #[serde(default)]
    pub sync: SyncConfig,
}

impl AppConfig {
    /// Load configuration from a specific file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(FluxVisError::Io)
            .with_context(|| format!("Failed to read config file {:?}", path))?;

        let mut config: AppConfig = toml::from_str(&content)
            .map_err(|e| FluxVisError::Serialization(e.to_string()))
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from the default location, falling back to defaults on any error
    ///
    /// A missing file is the normal first-run case and is not logged as a
    /// failure; parse errors are.
    pub fn load_or_default() -> Self {
        let mut config = match default_config_path() {
            Some(path) if path.exists() => match Self::load(&path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config, using defaults: {}", e);
                    Self::default()
                }
            },
            _ => Self::default(),
        };
        config.apply_env_overrides();
        config
    }

    /// Override credentials from the environment (`INFLUX_URL`,
    /// `INFLUX_TOKEN`, `INFLUX_ORG`)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("INFLUX_URL") {
            self.source.url = url;
        }
        if let Ok(token) = std::env::var("INFLUX_TOKEN") {
            self.source.token = token;
        }
        if let Ok(org) = std::env::var("INFLUX_ORG") {
            self.source.org = org;
        }
    }

    /// Save configuration as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(FluxVisError::Io)
                .context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| FluxVisError::Serialization(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(FluxVisError::Io)
            .with_context(|| format!("Failed to write config file {:?}", path))
    }
}
