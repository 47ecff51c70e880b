//! Capabilities a rule is assembled from.
//!
//! - [`MessageMatcher`]: custom predicate for criteria the built-in fields
//!   cannot express. Any `Fn(&InMessage) -> bool` is a matcher.
//! - [`Interceptor`]: gate in front of the handlers. Returning `Ok(false)`
//!   vetoes the rule for this message.
//! - [`Handler`]: produces the reply. Only the last handler's result is kept.
//!
//! Interceptors and handlers are async because they usually call the remote
//! platform through the [`ServiceClient`](courier_core::ServiceClient).
//! Synchronous logic can be wrapped with [`handler_fn`] and
//! [`interceptor_fn`].
//!
//! ```rust,ignore
//! struct Greeting;
//!
//! #[async_trait]
//! impl Handler for Greeting {
//!     async fn handle(
//!         &self,
//!         message: &InMessage,
//!         _ctx: &mut RuleContext,
//!         _client: &BoxedClient,
//!         _session: &BoxedSession,
//!     ) -> HandlerResult<Option<OutMessage>> {
//!         Ok(Some(OutMessage::text().content("welcome").build()))
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::RuleContext;
use courier_core::{BoxedClient, BoxedSession, HandlerResult, InMessage, OutMessage};

// ============================================================================
// Capability traits
// ============================================================================

/// Custom match criterion.
pub trait MessageMatcher: Send + Sync + 'static {
    fn matches(&self, message: &InMessage) -> bool;
}

impl<F> MessageMatcher for F
where
    F: Fn(&InMessage) -> bool + Send + Sync + 'static,
{
    fn matches(&self, message: &InMessage) -> bool {
        self(message)
    }
}

/// Pre-handler gate.
#[async_trait]
pub trait Interceptor: Send + Sync + 'static {
    /// Returns `Ok(false)` to stop the rule: no further interceptor and no
    /// handler will run for this message.
    async fn intercept(
        &self,
        message: &InMessage,
        ctx: &mut RuleContext,
        client: &BoxedClient,
        session: &BoxedSession,
    ) -> HandlerResult<bool>;
}

/// Reply producer.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Returns the reply, or `None` when this handler has nothing to say.
    /// Handlers of asynchronous rules may always return `None`.
    async fn handle(
        &self,
        message: &InMessage,
        ctx: &mut RuleContext,
        client: &BoxedClient,
        session: &BoxedSession,
    ) -> HandlerResult<Option<OutMessage>>;
}

// Shared capabilities can be registered on several rules.

#[async_trait]
impl<I: Interceptor + ?Sized> Interceptor for Arc<I> {
    async fn intercept(
        &self,
        message: &InMessage,
        ctx: &mut RuleContext,
        client: &BoxedClient,
        session: &BoxedSession,
    ) -> HandlerResult<bool> {
        (**self).intercept(message, ctx, client, session).await
    }
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn handle(
        &self,
        message: &InMessage,
        ctx: &mut RuleContext,
        client: &BoxedClient,
        session: &BoxedSession,
    ) -> HandlerResult<Option<OutMessage>> {
        (**self).handle(message, ctx, client, session).await
    }
}

/// A type-erased matcher that can be stored in a rule.
pub type BoxedMatcher = Arc<dyn MessageMatcher>;

/// A type-erased interceptor that can be stored in a rule.
pub type BoxedInterceptor = Arc<dyn Interceptor>;

/// A type-erased handler that can be stored in a rule.
pub type BoxedHandler = Arc<dyn Handler>;

// ============================================================================
// Closure adapters
// ============================================================================

/// A [`Handler`] backed by a synchronous closure.
#[derive(Clone)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: Fn(&InMessage, &mut RuleContext) -> HandlerResult<Option<OutMessage>>
        + Send
        + Sync
        + 'static,
{
    async fn handle(
        &self,
        message: &InMessage,
        ctx: &mut RuleContext,
        _client: &BoxedClient,
        _session: &BoxedSession,
    ) -> HandlerResult<Option<OutMessage>> {
        (self.f)(message, ctx)
    }
}

/// Wraps a closure that needs neither the client nor the session.
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&InMessage, &mut RuleContext) -> HandlerResult<Option<OutMessage>>
        + Send
        + Sync
        + 'static,
{
    HandlerFn { f }
}

/// An [`Interceptor`] backed by a synchronous closure.
#[derive(Clone)]
pub struct InterceptorFn<F> {
    f: F,
}

#[async_trait]
impl<F> Interceptor for InterceptorFn<F>
where
    F: Fn(&InMessage, &mut RuleContext) -> HandlerResult<bool> + Send + Sync + 'static,
{
    async fn intercept(
        &self,
        message: &InMessage,
        ctx: &mut RuleContext,
        _client: &BoxedClient,
        _session: &BoxedSession,
    ) -> HandlerResult<bool> {
        (self.f)(message, ctx)
    }
}

/// Wraps a closure that needs neither the client nor the session.
pub fn interceptor_fn<F>(f: F) -> InterceptorFn<F>
where
    F: Fn(&InMessage, &mut RuleContext) -> HandlerResult<bool> + Send + Sync + 'static,
{
    InterceptorFn { f }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{NoopClient, NoopSession};

    #[tokio::test]
    async fn closure_adapters_see_message_and_context() {
        let client: BoxedClient = Arc::new(NoopClient);
        let session: BoxedSession = Arc::new(NoopSession);
        let message = InMessage::new().with_from_user("o_user");
        let mut ctx = RuleContext::new();

        let gate = interceptor_fn(|msg, ctx| {
            ctx.insert("sender", msg.from_user.clone().unwrap_or_default());
            Ok(true)
        });
        let reply = handler_fn(|_, ctx| {
            let sender = ctx.get::<String>("sender").cloned().unwrap_or_default();
            Ok(Some(OutMessage::text().to_user(sender).content("hi").build()))
        });

        assert!(gate.intercept(&message, &mut ctx, &client, &session).await.unwrap());
        let out = reply
            .handle(&message, &mut ctx, &client, &session)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(out.to_user, "o_user");
    }

    #[tokio::test]
    async fn shared_handlers_register_on_several_rules() {
        let shared: BoxedHandler =
            Arc::new(handler_fn(|_, _| Ok(Some(OutMessage::text().content("shared").build()))));
        let gate: BoxedInterceptor = Arc::new(interceptor_fn(|_, _| Ok(true)));
        let router = crate::Router::builder()
            .rule()
            .r#async(false)
            .content("a")
            .interceptor(Arc::clone(&gate))
            .handler(Arc::clone(&shared))
            .end()
            .rule()
            .r#async(false)
            .content("b")
            .interceptor(gate)
            .handler(shared)
            .end()
            .build()
            .unwrap();

        for content in ["a", "b"] {
            let reply = router
                .route(InMessage::new().with_content(content))
                .await
                .unwrap();
            assert!(reply.is_some(), "no reply for {content}");
        }
    }

    #[test]
    fn closures_are_matchers() {
        let matcher: BoxedMatcher = Arc::new(|msg: &InMessage| msg.msg_id.is_some());
        assert!(matcher.matches(&InMessage::new().with_msg_id(1)));
        assert!(!matcher.matches(&InMessage::new()));
    }
}
