//! Dashboard page configuration

use crate::content::ReadMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Dashboard page configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Directory with the markdown resources shown on the page
    pub content_dir: PathBuf,
    /// How missing markdown resources are handled
    pub content_errors: ReadMode,
    pub default_area: String,
    pub default_window: usize,
    pub min_window: usize,
    pub max_window: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("share/dashboard"),
            content_errors: ReadMode::Ignore,
            default_area: "Italia".to_string(),
            default_window: 7,
            min_window: 1,
            max_window: 30,
        }
    }
}
