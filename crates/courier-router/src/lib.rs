//! # Courier Router
//!
//! Rule-based dispatch of inbound platform messages.
//!
//! A [`Router`] holds an ordered list of [`Rule`]s built once at startup
//! through [`RouterBuilder`] and [`RuleBuilder`]. For every message the
//! router finds the matching rule (or rules, with re-enter), runs its
//! interceptors and handlers, and returns the reply of the synchronous
//! rules. Asynchronous rules run on a bounded worker pool.
//!
//! ```rust,ignore
//! use courier_router::{Router, handler_fn};
//!
//! let router = Router::builder()
//!     .rule()
//!     .r#async(false)
//!     .msg_type("event")
//!     .event("subscribe")
//!     .handler(handler_fn(|_, _| Ok(Some(OutMessage::text().content("welcome").build()))))
//!     .end()
//!     .build()?;
//!
//! let reply = router.route(message).await?;
//! ```

pub mod context;
pub mod dedup;
pub mod dispatcher;
pub mod error;
pub mod handler;
mod pipeline;
pub mod predicate;
pub mod router;
pub mod rule;

pub use context::RuleContext;
pub use dedup::{DuplicateChecker, MemoryDuplicateChecker, dedup_key};
pub use dispatcher::Dispatcher;
pub use error::{BuildError, RouteError, RouteResult};
pub use handler::{
    BoxedHandler, BoxedInterceptor, BoxedMatcher, Handler, HandlerFn, Interceptor,
    InterceptorFn, MessageMatcher, handler_fn, interceptor_fn,
};
pub use predicate::Predicate;
pub use router::{Router, RouterBuilder};
pub use rule::{Rule, RuleBuilder};
