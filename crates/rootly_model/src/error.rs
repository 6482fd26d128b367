//! Error types for the access model.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while handling model values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The page token could not be decoded into a traversal stack.
    #[error("malformed page token: {0}")]
    MalformedToken(String),

    /// The traversal stack could not be encoded.
    #[error("failed to encode page token: {0}")]
    Encode(String),
}

impl ModelError {
    /// Creates a malformed token error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedToken(message.into())
    }
}
