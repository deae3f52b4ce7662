//! Error types for gleaner-core.

use crate::change::ChangeKind;
use thiserror::Error;

/// Result type alias for gleaner-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while harvesting.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A live recording record has no usable title.
    #[error("recording '{0}' has no title")]
    MissingTitle(String),

    /// A live recording record has no creation date.
    #[error("recording '{0}' has no created date")]
    MissingCreated(String),

    /// The batch size target must be at least one.
    #[error("preferred amount must be positive")]
    InvalidAmount,

    /// A source adapter failed to answer a change query.
    #[error("{kind} source query failed")]
    Source {
        kind: ChangeKind,
        #[source]
        source: anyhow::Error,
    },
}
