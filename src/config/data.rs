//! Dataset download and storage configuration

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw files of the Protezione Civile repository.
pub const DEFAULT_CONTAGIONS_URL: &str =
    "https://raw.githubusercontent.com/pcm-dpc/COVID-19/master";

/// Raw files of the vaccination open-data repository.
pub const DEFAULT_VACCINATIONS_URL: &str =
    "https://raw.githubusercontent.com/italia/covid19-opendata-vaccini/master/dati";

/// First day published by the Protezione Civile repository.
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 2, 24).unwrap_or_default()
}

/// Dataset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Root directory holding `contagions/` and `vaccinations/`
    pub dir: PathBuf,
    pub contagions_url: String,
    pub vaccinations_url: String,
    /// First day of contagion files to download
    pub start_date: NaiveDate,
    pub timeout_seconds: u64,
    pub max_concurrent_downloads: usize,
}

impl DataConfig {
    pub fn contagions_dir(&self) -> PathBuf {
        self.dir.join("contagions")
    }

    pub fn vaccinations_dir(&self) -> PathBuf {
        self.dir.join("vaccinations")
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("share"),
            contagions_url: DEFAULT_CONTAGIONS_URL.to_string(),
            vaccinations_url: DEFAULT_VACCINATIONS_URL.to_string(),
            start_date: default_start_date(),
            timeout_seconds: 30,
            max_concurrent_downloads: 8,
        }
    }
}

/// Background refresh configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub enabled: bool,
    /// Seconds between refresh cycles
    pub interval_seconds: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 3600,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_config_defaults() {
        let config = DataConfig::default();
        assert_eq!(config.dir, PathBuf::from("share"));
        assert_eq!(config.start_date.to_string(), "2020-02-24");
        assert_eq!(config.contagions_dir(), PathBuf::from("share/contagions"));
        assert_eq!(
            config.vaccinations_dir(),
            PathBuf::from("share/vaccinations")
        );
    }

    #[test]
    fn test_data_config_start_date_from_toml() {
        let config: DataConfig = toml::from_str("start_date = \"2021-01-01\"").unwrap();
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap());
        assert_eq!(config.max_concurrent_downloads, 8);
    }

    #[test]
    fn test_refresh_config_defaults() {
        let config = RefreshConfig::default();
        assert!(config.enabled);
        assert_eq!(config.interval_seconds, 3600);
    }
}
