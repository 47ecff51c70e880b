//! Error types for the router.

use courier_core::BoxError;
use thiserror::Error;

/// Returned by [`Router::route`](crate::Router::route) when a synchronous
/// rule fails with an unclassified error.
///
/// Recoverable API errors never show up here; they are handed to the error
/// handler and the rule simply produces no reply.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("rule '{rule}' failed: {source}")]
    Handler {
        /// Name of the failing rule, or its registration index.
        rule: String,
        #[source]
        source: BoxError,
    },
}

/// Errors detected while freezing the rule set.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A `content_pattern` is not a valid regular expression.
    #[error("rule '{rule}' has an invalid content pattern '{pattern}': {source}")]
    InvalidPattern {
        rule: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type for dispatch.
pub type RouteResult<T> = Result<T, RouteError>;
