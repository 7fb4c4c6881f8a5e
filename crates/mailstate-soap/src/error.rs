//! Error types for the wire-format library.

use thiserror::Error;

/// Errors that can occur while decoding wire objects.
#[derive(Debug, Error)]
pub enum Error {
    /// A participant carried a role code the client does not understand.
    #[error("Unknown participant role: {0:?}")]
    UnknownParticipantRole(String),

    /// JSON decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
