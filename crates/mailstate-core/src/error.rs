//! Error types for the core library.

use thiserror::Error;

use crate::store::RequestId;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A wire object violated the protocol contract.
    #[error("Wire format error: {0}")]
    Soap(#[from] mailstate_soap::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lifecycle event referenced a request whose pending stage was never seen.
    #[error("Unknown request: {0}")]
    UnknownRequest(RequestId),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
