//! Server configuration

use serde::{Deserialize, Serialize};

/// Port the dashboard listens on when nothing else is configured.
pub const DEFAULT_PORT: u16 = 8501;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            request_timeout_seconds: 30,
        }
    }
}
