//! Error types for dataset downloads.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while updating the local datasets.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request timeout
    #[error("request timeout after {0}s")]
    Timeout(u64),

    /// Connection failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Remote answered with a non-success status
    #[error("unable to download {url}: HTTP error {status}")]
    Http { url: String, status: u16 },

    /// Remote content could not be interpreted
    #[error("invalid content from {url}: {message}")]
    Parse { url: String, message: String },

    /// Local file system failure
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FetchError::Io {
            path: path.into(),
            source,
        }
    }
}
