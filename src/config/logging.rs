//! Logging configuration

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;

/// Modules that accept a `component_levels` entry.
pub const LOG_COMPONENTS: [&str; 8] = [
    "api", "charts", "cli", "content", "dashboard", "data", "fetch", "refresh",
];

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("unknown log format '{}', expected pretty or json", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level: trace, debug, info, warn, error or off
    pub level: String,
    pub format: LogFormat,
    /// Per-module levels, e.g. `fetch = "debug"` to trace downloads only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_levels: Option<HashMap<String, String>>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            component_levels: None,
        }
    }
}

impl LoggingConfig {
    /// Check the base level and every component entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_level("logging.level", &self.level)?;

        for (component, level) in self.component_levels.iter().flatten() {
            let field = format!("logging.component_levels.{}", component);
            if !LOG_COMPONENTS.contains(&component.as_str()) {
                return Err(ConfigError::validation(
                    &field,
                    format!("unknown component, expected one of {}", LOG_COMPONENTS.join(", ")),
                ));
            }
            check_level(&field, level)?;
        }

        Ok(())
    }
}

fn check_level(field: &str, level: &str) -> Result<(), ConfigError> {
    LevelFilter::from_str(level)
        .map(|_| ())
        .map_err(|_| ConfigError::validation(field, format!("'{}' is not a log level", level)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_components(entries: &[(&str, &str)]) -> LoggingConfig {
        LoggingConfig {
            component_levels: Some(
                entries
                    .iter()
                    .map(|(c, l)| (c.to_string(), l.to_string()))
                    .collect(),
            ),
            ..LoggingConfig::default()
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(serde_json::to_string(&LogFormat::Pretty).unwrap(), "\"pretty\"");
        assert!("logfmt".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_unknown_level_rejected() {
        let config = LoggingConfig {
            level: "loud".to_string(),
            ..LoggingConfig::default()
        };
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("logging.level"), "{}", err);
    }

    #[test]
    fn test_component_levels() {
        assert!(with_components(&[("fetch", "debug"), ("refresh", "trace")])
            .validate()
            .is_ok());

        let err = with_components(&[("routing", "debug")])
            .validate()
            .unwrap_err()
            .to_string();
        assert!(err.contains("logging.component_levels.routing"), "{}", err);

        assert!(with_components(&[("fetch", "chatty")]).validate().is_err());
    }
}
