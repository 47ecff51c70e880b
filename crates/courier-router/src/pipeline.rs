//! Execution pipeline of a single rule.
//!
//! For one message, a matched rule:
//!
//! 1. creates an empty [`RuleContext`],
//! 2. runs its interceptors in order; the first `false` ends the pipeline
//!    with no reply,
//! 3. runs its handlers in order, skipping absent slots; the reply is the
//!    result of the last handler that ran.
//!
//! A recoverable [`ApiError`](courier_core::ApiError) from any step ends the
//! pipeline, is reported to the error handler and yields no reply. Any other
//! error is returned to the caller as [`RouteError::Handler`].

use tracing::{debug, trace};

use crate::context::RuleContext;
use crate::error::{RouteError, RouteResult};
use crate::rule::Rule;
use courier_core::{
    BoxedClient, BoxedErrorHandler, BoxedSession, HandlerError, HandlerResult, InMessage,
    OutMessage,
};

impl Rule {
    /// Runs this rule's interceptors and handlers against `message`.
    ///
    /// Does not check the predicate; the router only calls this for rules
    /// whose [`test`](Rule::test) passed.
    pub async fn service(
        &self,
        message: &InMessage,
        client: &BoxedClient,
        session: &BoxedSession,
        error_handler: &BoxedErrorHandler,
    ) -> RouteResult<Option<OutMessage>> {
        match self.run_chain(message, client, session).await {
            Ok(reply) => Ok(reply),
            Err(HandlerError::Api(err)) => {
                debug!(rule = %self.label(), error = %err, "Rule aborted by remote API error");
                error_handler.handle(&err);
                Ok(None)
            }
            Err(HandlerError::Other(source)) => Err(RouteError::Handler {
                rule: self.label(),
                source,
            }),
        }
    }

    async fn run_chain(
        &self,
        message: &InMessage,
        client: &BoxedClient,
        session: &BoxedSession,
    ) -> HandlerResult<Option<OutMessage>> {
        let mut ctx = RuleContext::new();

        for (i, interceptor) in self.interceptors.iter().enumerate() {
            if !interceptor.intercept(message, &mut ctx, client, session).await? {
                debug!(
                    rule = %self.label(),
                    interceptor_index = i,
                    "Interceptor rejected message"
                );
                return Ok(None);
            }
        }

        let mut reply = None;
        for (i, handler) in self.handlers.iter().enumerate() {
            let Some(handler) = handler else {
                continue;
            };
            trace!(rule = %self.label(), handler_index = i, "Executing handler");
            reply = handler.handle(message, &mut ctx, client, session).await?;
        }

        Ok(reply)
    }
}
