//! Topic clustering error types.

use thiserror::Error;

/// Errors that can occur while clustering or labeling keywords.
#[derive(Debug, Error)]
pub enum TopicsError {
    /// Malformed input: empty batch, mismatched dimensions, non-square matrix
    #[error("Invalid input shape: {0}")]
    InputShape(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Labeling call failed
    #[error("Label request failed: {0}")]
    LabelCall(String),

    /// Labeling service rejected the call for rate limiting
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Labeling call did not complete in time
    #[error("Timeout waiting for label response")]
    Timeout,
}
