//! Configuration module for covidash
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`COVIDASH_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use covidash::config::CovidashConfig;
//!
//! let config = CovidashConfig::default();
//! assert_eq!(config.server.port, 8501);
//!
//! let toml = r#"
//! [server]
//! port = 9000
//! "#;
//! let config: CovidashConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.server.port, 9000);
//! ```

pub mod dashboard;
pub mod data;
pub mod error;
pub mod logging;
pub mod server;

pub use dashboard::DashboardConfig;
pub use data::{DataConfig, RefreshConfig};
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use server::ServerConfig;

use crate::data::Area;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Unified configuration for the dashboard service.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CovidashConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Dataset locations and download settings
    pub data: DataConfig,
    /// Background refresh of the datasets
    pub refresh: RefreshConfig,
    /// Page content and widget defaults
    pub dashboard: DashboardConfig,
}

impl CovidashConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Invalid values are ignored and the current value is kept.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("COVIDASH_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("COVIDASH_HOST") {
            self.server.host = host;
        }

        if let Ok(level) = std::env::var("COVIDASH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("COVIDASH_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(dir) = std::env::var("COVIDASH_DATA_DIR") {
            self.data.dir = PathBuf::from(dir);
        }
        if let Ok(refresh) = std::env::var("COVIDASH_REFRESH") {
            self.refresh.enabled = refresh.to_lowercase() == "true";
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "port must be non-zero",
            ));
        }

        self.logging.validate()?;

        if self.data.contagions_url.is_empty() {
            return Err(ConfigError::validation(
                "data.contagions_url",
                "URL cannot be empty",
            ));
        }
        if self.data.vaccinations_url.is_empty() {
            return Err(ConfigError::validation(
                "data.vaccinations_url",
                "URL cannot be empty",
            ));
        }
        if self.data.max_concurrent_downloads == 0 {
            return Err(ConfigError::validation(
                "data.max_concurrent_downloads",
                "must be at least 1",
            ));
        }

        if self.refresh.enabled && self.refresh.interval_seconds == 0 {
            return Err(ConfigError::validation(
                "refresh.interval_seconds",
                "interval must be non-zero",
            ));
        }

        let dashboard = &self.dashboard;
        if dashboard.min_window < 1 {
            return Err(ConfigError::validation(
                "dashboard.min_window",
                "window must be at least 1 day",
            ));
        }
        if dashboard.min_window > dashboard.max_window {
            return Err(ConfigError::validation(
                "dashboard.max_window",
                format!(
                    "max_window ({}) is smaller than min_window ({})",
                    dashboard.max_window, dashboard.min_window
                ),
            ));
        }
        if !(dashboard.min_window..=dashboard.max_window).contains(&dashboard.default_window) {
            return Err(ConfigError::validation(
                "dashboard.default_window",
                format!(
                    "{} is outside {}..={}",
                    dashboard.default_window, dashboard.min_window, dashboard.max_window
                ),
            ));
        }
        if let Err(e) = Area::parse(&dashboard.default_area) {
            return Err(ConfigError::validation(
                "dashboard.default_area",
                e.to_string(),
            ));
        }

        Ok(())
    }
}
