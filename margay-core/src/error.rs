//! Structured error types for the Margay ecosystem.

use thiserror::Error;

/// Unified error type for all Margay operations.
///
/// Every error is local to a single alignment call; nothing here carries
/// process-wide state and no operation retries internally.
#[derive(Debug, Error)]
pub enum MargayError {
    /// I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error (malformed input data)
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid input (bad arguments, out-of-range values)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A dynamic-programming table would exceed the practical memory bound.
    ///
    /// Reported distinctly from [`MargayError::InvalidInput`] so callers can
    /// skip or downsize oversized inputs instead of treating them as
    /// malformed.
    #[error("resource limit: {0}")]
    ResourceLimit(String),

    /// A state transition the model does not define was encountered while
    /// re-scoring an externally supplied alignment.
    #[error("illegal transition: {0}")]
    IllegalTransition(String),
}

/// Convenience alias used throughout the Margay ecosystem.
pub type Result<T> = std::result::Result<T, MargayError>;
