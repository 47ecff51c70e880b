//! Collaborators the router hands through to interceptors and handlers.
//!
//! The router never looks inside a [`ServiceClient`] or a [`SessionManager`];
//! it only passes them along. Implementations live with the platform API
//! client and the session store, both outside this workspace.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::error;

use crate::error::{ApiError, ApiResult};

/// Client for the remote messaging platform's API.
#[async_trait]
pub trait ServiceClient: Send + Sync + 'static {
    /// Calls an API endpoint with a JSON body.
    async fn call_api(&self, path: &str, body: &Value) -> ApiResult<Value>;

    /// Allows downcasting to the concrete client type.
    fn as_any(&self) -> &dyn Any;
}

/// Session store keyed by the sender's user id.
pub trait SessionManager: Send + Sync + 'static {
    /// Marks the end of one access to the sender's session.
    ///
    /// Called by the router after each matched rule's pipeline has finished.
    fn end_access(&self, _session_id: &str) {}

    /// Allows downcasting to the concrete session manager type.
    fn as_any(&self) -> &dyn Any;
}

/// Receives recoverable [`ApiError`]s caught by the execution pipeline.
pub trait ErrorHandler: Send + Sync + 'static {
    fn handle(&self, error: &ApiError);
}

impl<F> ErrorHandler for F
where
    F: Fn(&ApiError) + Send + Sync + 'static,
{
    fn handle(&self, error: &ApiError) {
        self(error)
    }
}

/// Shared handle to a [`ServiceClient`].
pub type BoxedClient = Arc<dyn ServiceClient>;

/// Shared handle to a [`SessionManager`].
pub type BoxedSession = Arc<dyn SessionManager>;

/// Shared handle to an [`ErrorHandler`].
pub type BoxedErrorHandler = Arc<dyn ErrorHandler>;

// =============================================================================
// Default implementations
// =============================================================================

/// Logs every caught error at `error` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogErrorHandler;

impl ErrorHandler for LogErrorHandler {
    fn handle(&self, err: &ApiError) {
        error!(errcode = ?err.errcode(), error = %err, "Remote API call failed");
    }
}

/// A client that is not connected to anything; every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopClient;

#[async_trait]
impl ServiceClient for NoopClient {
    async fn call_api(&self, path: &str, _body: &Value) -> ApiResult<Value> {
        Err(ApiError::Other(format!("no API client configured for '{path}'")))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A session manager that keeps no sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSession;

impl SessionManager for NoopSession {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn noop_client_rejects_calls() {
        let client: BoxedClient = Arc::new(NoopClient);
        let err = client.call_api("menu/get", &Value::Null).await.unwrap_err();

        assert!(matches!(err, ApiError::Other(ref m) if m.contains("menu/get")));
        assert!(client.as_any().downcast_ref::<NoopClient>().is_some());
    }

    #[test]
    fn closures_are_error_handlers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let handler: BoxedErrorHandler = Arc::new(move |_: &ApiError| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        handler.handle(&ApiError::Timeout);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
