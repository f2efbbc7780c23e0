//! Unified error types for Lodestar.

use thiserror::Error;

/// The main error type for Lodestar operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed problem input.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A literal outside the reserved variable range, zero, or `i32::MIN`.
    #[error("Invalid literal: {0}")]
    InvalidLiteral(i32),

    /// An operation was issued in a state that does not support it.
    #[error("Invalid state: {0}")]
    InvalidState(&'static str),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource exhaustion.
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Internal solver error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
