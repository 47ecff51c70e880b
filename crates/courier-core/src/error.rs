//! Error taxonomy shared by every Courier crate.
//!
//! Two kinds of failure can come out of an interceptor or handler:
//!
//! - [`ApiError`]: a call to the remote messaging platform failed in a
//!   well-understood way. The execution pipeline catches it and hands it to
//!   the configured [`ErrorHandler`](crate::ErrorHandler); the message gets
//!   no reply.
//! - anything else, carried by [`HandlerError::Other`]. The pipeline does
//!   not catch it and the whole dispatch call fails.

use thiserror::Error;

/// A boxed, thread-safe error used for unclassified failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// =============================================================================
// API Errors
// =============================================================================

/// Recoverable failure of a call to the remote messaging platform.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The platform answered with a non-zero error code.
    #[error("API error ({errcode}): {errmsg}")]
    Rejected { errcode: i64, errmsg: String },
    /// The API call timed out.
    #[error("API call timed out")]
    Timeout,
    /// Failed to serialize/deserialize.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// Creates a [`ApiError::Rejected`] from the platform's error pair.
    pub fn rejected(errcode: i64, errmsg: impl Into<String>) -> Self {
        Self::Rejected {
            errcode,
            errmsg: errmsg.into(),
        }
    }

    /// Returns the platform error code, if the platform produced one.
    pub fn errcode(&self) -> Option<i64> {
        match self {
            Self::Rejected { errcode, .. } => Some(*errcode),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// =============================================================================
// Handler Errors
// =============================================================================

/// Error returned by interceptors and handlers.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Recoverable remote-service failure; caught by the pipeline.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Any other failure; propagates to the caller of the router.
    #[error(transparent)]
    Other(BoxError),
}

impl HandlerError {
    /// Wraps an arbitrary error as an unclassified failure.
    pub fn other<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Other(err.into())
    }

    /// Returns `true` for the recoverable remote-service kind.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Api(_))
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for calls to the remote platform.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type for interceptors and handlers.
pub type HandlerResult<T> = Result<T, HandlerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_converts_into_recoverable_handler_error() {
        let err: HandlerError = ApiError::rejected(40001, "invalid credential").into();
        assert!(err.is_recoverable());
        assert_eq!(err.to_string(), "API error (40001): invalid credential");
    }

    #[test]
    fn other_error_is_not_recoverable() {
        let err = HandlerError::other("boom");
        assert!(!err.is_recoverable());
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn serde_failure_maps_to_serialization() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ApiError::from(parse);
        assert!(matches!(err, ApiError::Serialization(_)));
        assert_eq!(err.errcode(), None);
    }
}
