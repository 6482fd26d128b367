//! Error types for the connector.

use rootly_client::{ClientError, Operation};
use rootly_model::ModelError;
use thiserror::Error;

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Errors that can occur while listing resources, entitlements or grants.
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// The page token could not be decoded.
    #[error("malformed page token: {0}")]
    MalformedToken(String),

    /// An upstream call failed.
    #[error("rootly-connector: {operation} failed: {source}")]
    Upstream {
        /// Logical upstream operation.
        operation: Operation,
        /// Underlying client error.
        #[source]
        source: ClientError,
    },

    /// A required identifier was empty.
    #[error("required field missing: {0}")]
    RequiredFieldMissing(&'static str),

    /// The next page token could not be encoded.
    #[error("failed to encode page token: {0}")]
    Encode(String),

    /// Credentials or endpoint could not be validated.
    #[error("rootly-connector: failed to validate credentials: {source}")]
    Validation {
        /// Underlying client error.
        #[source]
        source: ClientError,
    },

    /// A listing did not finish within the configured page limit.
    #[error("{what} for {resource} did not finish within {limit} pages")]
    PageLimitExceeded {
        /// What was being listed.
        what: &'static str,
        /// Resource (or resource type) being listed.
        resource: String,
        /// Page limit.
        limit: usize,
    },
}

impl ConnectorError {
    /// Returns a mapper wrapping a client error for `operation`.
    pub fn upstream(operation: Operation) -> impl FnOnce(ClientError) -> ConnectorError {
        move |source| ConnectorError::Upstream { operation, source }
    }

    /// Returns the failed upstream operation, if this is an upstream error.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            ConnectorError::Upstream { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}

impl From<ModelError> for ConnectorError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::MalformedToken(message) => ConnectorError::MalformedToken(message),
            ModelError::Encode(message) => ConnectorError::Encode(message),
        }
    }
}

/// Fails with `RequiredFieldMissing` if `value` is empty.
pub(crate) fn require(value: &str, field: &'static str) -> ConnectorResult<()> {
    if value.is_empty() {
        Err(ConnectorError::RequiredFieldMissing(field))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_names_operation() {
        let err =
            ConnectorError::upstream(Operation::ListScheduleRotations)(ClientError::status(503));
        assert_eq!(err.operation(), Some(Operation::ListScheduleRotations));
        assert_eq!(
            err.to_string(),
            "rootly-connector: list-schedule-rotations failed: upstream returned status 503"
        );
    }

    #[test]
    fn model_errors_convert() {
        let err: ConnectorError = ModelError::malformed("eof").into();
        assert!(matches!(err, ConnectorError::MalformedToken(_)));
        assert_eq!(err.operation(), None);

        let err: ConnectorError = ModelError::Encode("io".into()).into();
        assert!(matches!(err, ConnectorError::Encode(_)));
    }
}
