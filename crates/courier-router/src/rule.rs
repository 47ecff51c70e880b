//! Routing rules and their fluent builder.
//!
//! A [`Rule`] bundles a [`Predicate`], an interceptor chain, a handler chain
//! and two dispatch flags. Rules are only ever created through a
//! [`RuleBuilder`] obtained from [`RouterBuilder::rule`]; the builder's
//! terminal operation freezes the rule and appends it to the router
//! builder. Once frozen, a rule has no mutators.
//!
//! ```rust,ignore
//! let router = Router::builder()
//!     .rule()
//!         .r#async(false)
//!         .msg_type("event")
//!         .event("subscribe")
//!         .handler(Greeting)
//!         .end()
//!     .rule()
//!         .content_pattern("^help.*")
//!         .interceptor(RateLimit::default())
//!         .handler(HelpMenu)
//!         .next()          // keep scanning after this rule
//!     .rule()
//!         .handler(AuditLog) // catch-all
//!         .end()
//!     .build()?;
//! ```

use std::sync::Arc;

use tracing::trace;

use crate::error::BuildError;
use crate::handler::{
    BoxedHandler, BoxedInterceptor, BoxedMatcher, Handler, Interceptor, MessageMatcher,
};
use crate::predicate::Predicate;
use crate::router::RouterBuilder;
use courier_core::InMessage;

// ============================================================================
// Rule
// ============================================================================

/// A frozen routing rule.
pub struct Rule {
    pub(crate) name: Option<String>,
    /// Position in the router's rule sequence.
    pub(crate) index: usize,
    pub(crate) predicate: Predicate,
    pub(crate) interceptors: Vec<BoxedInterceptor>,
    /// `None` entries are skipped by the pipeline.
    pub(crate) handlers: Vec<Option<BoxedHandler>>,
    pub(crate) is_async: bool,
    pub(crate) re_enter: bool,
}

impl Rule {
    /// Returns `true` if this rule accepts `message`.
    pub fn test(&self, message: &InMessage) -> bool {
        self.predicate.test(message)
    }

    /// Returns the name given on the builder, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the name, or `#<index>` for unnamed rules. Used in logs and errors.
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("#{}", self.index))
    }

    /// Returns the position of this rule in the router.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Whether the pipeline runs on a background worker.
    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// Whether scanning continues after this rule matched.
    pub fn is_re_enter(&self) -> bool {
        self.re_enter
    }

    pub fn interceptor_count(&self) -> usize {
        self.interceptors.len()
    }

    /// Number of handler slots, including absent ones.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("predicate", &self.predicate)
            .field("interceptor_count", &self.interceptors.len())
            .field("handler_count", &self.handlers.len())
            .field("is_async", &self.is_async)
            .field("re_enter", &self.re_enter)
            .finish()
    }
}

// ============================================================================
// RuleBuilder
// ============================================================================

/// Fluent configuration of one rule.
///
/// Every setter stores exactly one value; calling it again overwrites the
/// previous value. `interceptor`/`handler` append, and the order of addition
/// is the order of execution.
#[must_use = "a rule is only registered by calling `end()` or `next()`"]
pub struct RuleBuilder {
    router: RouterBuilder,
    name: Option<String>,
    is_async: bool,
    from_user: Option<String>,
    msg_type: Option<String>,
    event: Option<String>,
    event_key: Option<String>,
    content: Option<String>,
    content_pattern: Option<String>,
    matcher: Option<BoxedMatcher>,
    interceptors: Vec<BoxedInterceptor>,
    handlers: Vec<Option<BoxedHandler>>,
}

impl RuleBuilder {
    pub(crate) fn new(router: RouterBuilder) -> Self {
        Self {
            router,
            name: None,
            is_async: true,
            from_user: None,
            msg_type: None,
            event: None,
            event_key: None,
            content: None,
            content_pattern: None,
            matcher: None,
            interceptors: Vec::new(),
            handlers: Vec::new(),
        }
    }

    /// Sets a name for this rule (useful for debugging).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets whether the pipeline runs on a background worker. Defaults to `true`.
    ///
    /// Asynchronous rules never contribute a reply.
    pub fn r#async(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    /// Matches only messages from this exact user id.
    pub fn from_user(mut self, from_user: impl Into<String>) -> Self {
        self.from_user = Some(from_user.into());
        self
    }

    /// Matches the message type, ignoring case.
    pub fn msg_type(mut self, msg_type: impl Into<String>) -> Self {
        self.msg_type = Some(msg_type.into().to_lowercase());
        self
    }

    /// Matches the event name, ignoring case.
    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into().to_lowercase());
        self
    }

    /// Matches the event key, ignoring case.
    pub fn event_key(mut self, event_key: impl Into<String>) -> Self {
        self.event_key = Some(event_key.into().to_lowercase());
        self
    }

    /// Matches the trimmed content exactly.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Matches the trimmed content against a regular expression.
    ///
    /// The expression must match the whole content. An invalid expression is
    /// reported by [`RouterBuilder::build`].
    pub fn content_pattern(mut self, regex: impl Into<String>) -> Self {
        self.content_pattern = Some(regex.into());
        self
    }

    /// Adds a custom criterion for anything the other clauses cannot express.
    pub fn matcher<M: MessageMatcher>(mut self, matcher: M) -> Self {
        self.matcher = Some(Arc::new(matcher));
        self
    }

    /// Appends an interceptor.
    pub fn interceptor<I: Interceptor>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Appends several pre-built interceptors, in iteration order.
    pub fn interceptors<T>(mut self, interceptors: T) -> Self
    where
        T: IntoIterator<Item = BoxedInterceptor>,
    {
        self.interceptors.extend(interceptors);
        self
    }

    /// Appends a handler.
    pub fn handler<H: Handler>(mut self, handler: H) -> Self {
        self.handlers.push(Some(Arc::new(handler)));
        self
    }

    /// Appends several pre-built handler slots, in iteration order.
    ///
    /// `None` slots are kept and skipped at execution time.
    pub fn handlers<T>(mut self, handlers: T) -> Self
    where
        T: IntoIterator<Item = Option<BoxedHandler>>,
    {
        self.handlers.extend(handlers);
        self
    }

    /// Finishes the rule. A message matching it will not reach later rules.
    pub fn end(self) -> RouterBuilder {
        self.finish(false)
    }

    /// Finishes the rule. A message matching it still reaches later rules.
    pub fn next(self) -> RouterBuilder {
        self.finish(true)
    }

    fn finish(self, re_enter: bool) -> RouterBuilder {
        let Self {
            mut router,
            name,
            is_async,
            from_user,
            msg_type,
            event,
            event_key,
            content,
            content_pattern,
            matcher,
            interceptors,
            handlers,
        } = self;

        let index = router.rule_count();
        let content_pattern = match content_pattern {
            None => None,
            Some(pattern) => match Predicate::compile_pattern(&pattern) {
                Ok(regex) => Some(regex),
                Err(source) => {
                    router.record_error(BuildError::InvalidPattern {
                        rule: name.clone().unwrap_or_else(|| format!("#{index}")),
                        pattern,
                        source,
                    });
                    return router;
                }
            },
        };

        let rule = Rule {
            name,
            index,
            predicate: Predicate {
                from_user,
                msg_type,
                event,
                event_key,
                content,
                content_pattern,
                matcher,
            },
            interceptors,
            handlers,
            is_async,
            re_enter,
        };

        trace!(rule = %rule.label(), re_enter, is_async, "Rule registered");
        router.push_rule(rule);
        router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::router::Router;

    #[test]
    fn defaults_are_async_without_re_enter() {
        let builder = Router::builder().rule().end();
        let router = builder.build().unwrap();
        let rule = router.rules().next().unwrap();

        assert!(rule.is_async());
        assert!(!rule.is_re_enter());
        assert!(rule.predicate().is_catch_all());
        assert_eq!(rule.label(), "#0");
    }

    #[test]
    fn next_sets_re_enter() {
        let router = Router::builder()
            .rule()
            .name("first")
            .next()
            .rule()
            .end()
            .build()
            .unwrap();
        let rules: Vec<_> = router.rules().collect();

        assert_eq!(rules.len(), 2);
        assert!(rules[0].is_re_enter());
        assert_eq!(rules[0].name(), Some("first"));
        assert!(!rules[1].is_re_enter());
        assert_eq!(rules[1].index(), 1);
    }

    #[test]
    fn last_setter_call_wins() {
        let router = Router::builder()
            .rule()
            .event("click")
            .event("view")
            .r#async(false)
            .r#async(true)
            .end()
            .build()
            .unwrap();
        let rule = router.rules().next().unwrap();

        assert!(rule.is_async());
        assert!(rule.test(&InMessage::new().with_event("VIEW")));
        assert!(!rule.test(&InMessage::new().with_event("click")));
    }

    #[test]
    fn handler_slots_keep_registration_order() {
        let reply = handler_fn(|_, _| Ok(None));
        let router = Router::builder()
            .rule()
            .handler(reply.clone())
            .handlers([None, Some(Arc::new(reply) as BoxedHandler)])
            .end()
            .build()
            .unwrap();
        let rule = router.rules().next().unwrap();

        assert_eq!(rule.handler_count(), 3);
        assert!(rule.handlers[1].is_none());
        assert_eq!(rule.interceptor_count(), 0);
    }

    #[test]
    fn invalid_pattern_fails_build() {
        let err = Router::builder()
            .rule()
            .name("broken")
            .content_pattern("(unclosed")
            .end()
            .build()
            .unwrap_err();

        let BuildError::InvalidPattern { rule, pattern, .. } = err;
        assert_eq!(rule, "broken");
        assert_eq!(pattern, "(unclosed");
    }
}
