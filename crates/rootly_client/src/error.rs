//! Error types for the upstream client.

use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// A JSON:API error object returned with a non-success status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    /// Short summary.
    #[serde(default)]
    pub title: Option<String>,
    /// HTTP status, as a string.
    #[serde(default)]
    pub status: Option<String>,
    /// Application-specific code.
    #[serde(default)]
    pub code: Option<String>,
    /// Detailed explanation.
    #[serde(default)]
    pub detail: Option<String>,
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title.as_deref().unwrap_or("error"))?;
        if let Some(code) = &self.code {
            write!(f, " ({code})")?;
        }
        if let Some(detail) = &self.detail {
            write!(f, ": {detail}")?;
        }
        Ok(())
    }
}

fn describe_body(body: &Option<ErrorBody>) -> String {
    body.as_ref().map(|b| format!(": {b}")).unwrap_or_default()
}

/// Errors that can occur when talking to Rootly.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network or transport error. Always retryable.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status.
    #[error("upstream returned status {status}{}", describe_body(.error))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Decoded error body, if any.
        error: Option<ErrorBody>,
        /// Server-requested delay before retrying.
        retry_after: Option<Duration>,
    },

    /// Response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// A request URL could not be built.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// A page cursor pointed outside the configured API.
    #[error("page cursor does not belong to {base_url}")]
    InvalidCursor {
        /// Configured base URL.
        base_url: String,
    },

    /// A required identifier was empty.
    #[error("required field missing: {0}")]
    RequiredFieldMissing(&'static str),
}

impl ClientError {
    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a status error without a body.
    pub fn status(status: u16) -> Self {
        Self::Status {
            status,
            error: None,
            retry_after: None,
        }
    }

    /// Returns true if this error can be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns the server-requested retry delay, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ClientError::Status { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// Fails with `RequiredFieldMissing` if `value` is empty.
pub(crate) fn require(value: &str, field: &'static str) -> ClientResult<()> {
    if value.is_empty() {
        Err(ClientError::RequiredFieldMissing(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(ClientError::transport("connection reset").is_retryable());
        assert!(ClientError::status(429).is_retryable());
        assert!(ClientError::status(503).is_retryable());
        assert!(!ClientError::status(404).is_retryable());
        assert!(!ClientError::Decode("eof".into()).is_retryable());
    }

    #[test]
    fn status_display_includes_body() {
        let err = ClientError::Status {
            status: 401,
            error: Some(ErrorBody {
                title: Some("Unauthorized".into()),
                status: Some("401".into()),
                code: Some("invalid_token".into()),
                detail: Some("API key revoked".into()),
            }),
            retry_after: None,
        };
        assert_eq!(
            err.to_string(),
            "upstream returned status 401: Unauthorized (invalid_token): API key revoked"
        );
        assert_eq!(ClientError::status(500).to_string(), "upstream returned status 500");
    }

    #[test]
    fn require_rejects_empty() {
        assert!(require("S1", "schedule_id").is_ok());
        assert!(matches!(
            require("", "schedule_id"),
            Err(ClientError::RequiredFieldMissing("schedule_id"))
        ));
    }
}
