//! Common error types for crypt4gh key management.

use thiserror::Error;

/// Top-level error type for key management operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key file envelope or payload is malformed.
    #[error("Format error: {0}")]
    Format(String),

    /// Randomness source failed while generating key material.
    #[error("Entropy error: {0}")]
    Entropy(String),

    /// Peer public key is a low-order point; the Diffie-Hellman output is degenerate.
    #[error("Low-order point: peer public key yields a degenerate shared secret")]
    LowOrderPoint,

    /// Invalid input provided.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Create a new format error.
    pub fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }

    /// Create a new validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
