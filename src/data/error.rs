//! Error types for dataset loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the local datasets.
#[derive(Debug, Error)]
pub enum DataError {
    /// Area label matches neither "Italia" nor a region
    #[error("unknown area: {0}")]
    UnknownArea(String),

    /// Dataset directory or file is absent
    #[error("dataset not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
