//! Crate-level error type shared by identifier and parsing helpers.

/// Errors surfaced while working with core identifier/value types.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A string failed to parse as one of the typed identifiers.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] super::id::UuidParseError),

    /// A value failed to round-trip through JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
