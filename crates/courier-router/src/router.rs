//! The router: an ordered rule set and its dispatch loop.
//!
//! Rules are evaluated in registration order. The first matching rule
//! handles the message; scanning continues past it only if the rule was
//! finished with [`RuleBuilder::next`]. Synchronous rules run on the
//! caller's task and may produce the reply. Asynchronous rules are handed
//! to the [`Dispatcher`] and never produce a reply.
//!
//! ```text
//! route(msg)
//!   │
//!   ├─ duplicate? ──yes──▶ Ok(None)
//!   │
//!   └─ for rule in rules:
//!        test(msg)? ──no──▶ continue
//!        async?  ──yes──▶ dispatcher.spawn(service)      (no reply)
//!                ──no───▶ reply = service(msg) or keep previous
//!        re_enter? ──no──▶ break
//! ```

use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use tracing::{Instrument, debug, debug_span, error};

use crate::dedup::{DuplicateChecker, dedup_key};
use crate::dispatcher::{DEFAULT_POOL_SIZE, Dispatcher};
use crate::error::{BuildError, RouteError, RouteResult};
use crate::rule::{Rule, RuleBuilder};
use courier_core::{
    BoxedClient, BoxedErrorHandler, BoxedSession, ErrorHandler, InMessage, LogErrorHandler,
    NoopClient, NoopSession, OutMessage, ServiceClient, SessionManager,
};

// ============================================================================
// RouterBuilder
// ============================================================================

/// Collects rules and collaborators, then freezes them into a [`Router`].
pub struct RouterBuilder {
    rules: Vec<Rule>,
    errors: Vec<BuildError>,
    client: BoxedClient,
    session: BoxedSession,
    error_handler: BoxedErrorHandler,
    duplicate_checker: Option<Arc<dyn DuplicateChecker>>,
    pool_size: usize,
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RouterBuilder {
    /// Creates an empty builder.
    ///
    /// Until replaced, the client and session manager are no-op placeholders
    /// and caught API errors are logged.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            errors: Vec::new(),
            client: Arc::new(NoopClient),
            session: Arc::new(NoopSession),
            error_handler: Arc::new(LogErrorHandler),
            duplicate_checker: None,
            pool_size: DEFAULT_POOL_SIZE,
        }
    }

    /// Opens a new rule. Finish it with [`RuleBuilder::end`] or
    /// [`RuleBuilder::next`] to get this builder back.
    pub fn rule(self) -> RuleBuilder {
        RuleBuilder::new(self)
    }

    pub fn client<C: ServiceClient>(mut self, client: C) -> Self {
        self.client = Arc::new(client);
        self
    }

    pub fn session<S: SessionManager>(mut self, session: S) -> Self {
        self.session = Arc::new(session);
        self
    }

    /// Sets the receiver of recoverable API errors caught by pipelines.
    pub fn error_handler<E: ErrorHandler>(mut self, error_handler: E) -> Self {
        self.error_handler = Arc::new(error_handler);
        self
    }

    /// Enables duplicate suppression. Without a checker every message is routed.
    pub fn duplicate_checker<D: DuplicateChecker>(mut self, checker: D) -> Self {
        self.duplicate_checker = Some(Arc::new(checker));
        self
    }

    /// Maximum number of asynchronous pipelines running at once.
    pub fn worker_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    pub(crate) fn rule_count(&self) -> usize {
        self.rules.len() + self.errors.len()
    }

    pub(crate) fn record_error(&mut self, error: BuildError) {
        self.errors.push(error);
    }

    pub(crate) fn push_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Freezes the rule set.
    ///
    /// Fails with the first error recorded while rules were being finished.
    pub fn build(self) -> Result<Router, BuildError> {
        if let Some(error) = self.errors.into_iter().next() {
            return Err(error);
        }

        debug!(
            rules = self.rules.len(),
            pool_size = self.pool_size,
            dedup = self.duplicate_checker.is_some(),
            "Router built"
        );

        Ok(Router {
            inner: Arc::new(RouterInner {
                rules: self.rules.into_iter().map(Arc::new).collect(),
                client: self.client,
                session: self.session,
                error_handler: self.error_handler,
                duplicate_checker: self.duplicate_checker,
                dispatcher: Dispatcher::new(self.pool_size),
            }),
        })
    }
}

// ============================================================================
// Router
// ============================================================================

struct RouterInner {
    rules: Vec<Arc<Rule>>,
    client: BoxedClient,
    session: BoxedSession,
    error_handler: BoxedErrorHandler,
    duplicate_checker: Option<Arc<dyn DuplicateChecker>>,
    dispatcher: Dispatcher,
}

/// A frozen, shareable rule set.
///
/// Cloning is cheap; clones share rules, collaborators and the worker pool.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Iterates the rules in registration order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.inner.rules.iter().map(Arc::as_ref)
    }

    pub fn rule_count(&self) -> usize {
        self.inner.rules.len()
    }

    /// Routes one inbound message.
    ///
    /// Returns the reply of the last synchronous rule that produced one, or
    /// `None`. An unclassified error from a synchronous rule aborts the scan.
    /// Must be called from within a tokio runtime.
    pub async fn route(&self, message: InMessage) -> RouteResult<Option<OutMessage>> {
        let span = debug_span!(
            "route",
            msg_type = message.msg_type.as_deref().unwrap_or(""),
            from_user = message.from_user.as_deref().unwrap_or(""),
        );
        self.dispatch(Arc::new(message)).instrument(span).await
    }

    async fn dispatch(&self, message: Arc<InMessage>) -> RouteResult<Option<OutMessage>> {
        let inner = &self.inner;

        if let Some(checker) = &inner.duplicate_checker {
            let key = dedup_key(&message);
            if checker.is_duplicate(&key) {
                debug!(key = %key, "Duplicate message dropped");
                return Ok(None);
            }
        }

        let mut reply = None;
        for rule in &inner.rules {
            if !rule.test(&message) {
                continue;
            }
            debug!(rule = %rule.label(), is_async = rule.is_async(), "Rule matched");

            if rule.is_async() {
                self.spawn_pipeline(Arc::clone(rule), Arc::clone(&message));
            } else {
                let result = rule
                    .service(&message, &inner.client, &inner.session, &inner.error_handler)
                    .await;
                inner.session.end_access(session_id(&message));
                if let Some(out) = result? {
                    reply = Some(out);
                }
            }

            if !rule.is_re_enter() {
                break;
            }
        }

        Ok(reply)
    }

    fn spawn_pipeline(&self, rule: Arc<Rule>, message: Arc<InMessage>) {
        let inner = Arc::clone(&self.inner);
        let task = async move {
            let result = rule
                .service(&message, &inner.client, &inner.session, &inner.error_handler)
                .await;
            if let Err(err) = result {
                error!(error = %err, "Asynchronous rule failed");
            }
            inner.session.end_access(session_id(&message));
        };
        self.inner.dispatcher.spawn(task.in_current_span());
    }

    /// Stops accepting asynchronous work and waits for in-flight pipelines.
    ///
    /// Synchronous rules keep working afterwards; asynchronous matches are
    /// dropped with a warning.
    pub async fn shutdown(&self) {
        self.inner.dispatcher.shutdown().await;
    }

    /// Number of asynchronous pipelines submitted and not yet finished.
    pub fn in_flight(&self) -> usize {
        self.inner.dispatcher.in_flight()
    }
}

fn session_id(message: &InMessage) -> &str {
    message.from_user.as_deref().unwrap_or("")
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("rules", &self.inner.rules)
            .field("dispatcher", &self.inner.dispatcher)
            .field("dedup", &self.inner.duplicate_checker.is_some())
            .finish()
    }
}

impl tower::Service<InMessage> for Router {
    type Response = Option<OutMessage>;
    type Error = RouteError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, message: InMessage) -> Self::Future {
        let router = self.clone();
        Box::pin(async move { router.route(message).await })
    }
}
