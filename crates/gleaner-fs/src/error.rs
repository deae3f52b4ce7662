//! Error types for the file-backed feeds.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for feed operations.
pub type Result<T> = std::result::Result<T, FsError>;

/// Errors that can occur while reading a change feed.
#[derive(Debug, Error)]
pub enum FsError {
    /// Feed file not found at the specified path.
    #[error("change feed not found at '{0}'")]
    FeedNotFound(PathBuf),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A feed line failed to parse as a change record.
    #[error("malformed change at {path}:{line}")]
    Malformed {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
