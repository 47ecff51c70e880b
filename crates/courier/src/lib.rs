//! # Courier
//!
//! A rule-based router for inbound messages of a messaging platform's
//! webhook: user messages and events such as subscribe or menu clicks.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐     ┌────────┐  sync   ┌────────────────────────────────┐
//! │ Webhook  │────▶│ Router │────────▶│ Rule: interceptors ─▶ handlers │──▶ reply
//! │ (caller) │     │        │  async  ├────────────────────────────────┤
//! └──────────┘     └────────┘────────▶│ worker pool (fire-and-forget)  │
//!                                     └────────────────────────────────┘
//! ```
//!
//! - **Router**: ordered rules, first match wins unless the rule re-enters
//! - **Rules**: a predicate over the message plus interceptor and handler chains
//! - **Runtime**: configuration, logging and router presets
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = bootstrap(ConfigLoader::new())?;
//!
//!     let router = router_builder(&config.router)
//!         .rule()
//!         .r#async(false)
//!         .msg_type("event")
//!         .event("subscribe")
//!         .handler(handler_fn(|_, _| {
//!             Ok(Some(OutMessage::text().content("Welcome!").build()))
//!         }))
//!         .end()
//!         .build()?;
//!
//!     let reply = router.route(InMessage::from_json(body)?).await?;
//!     router.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: load `courier.toml` (default)
//! - `yaml-config`: load `courier.yaml`
//! - `json-log`: JSON log output

pub use courier_core as core;
pub use courier_router as router;
pub use courier_runtime as runtime;

/// Commonly used types for building a router.
///
/// ```rust,ignore
/// use courier::prelude::*;
/// ```
pub mod prelude {
    // Runtime - configuration and presets
    pub use courier_runtime::{ConfigLoader, CourierConfig, bootstrap, router_builder};

    // Router - rules and dispatch
    pub use courier_router::{
        BuildError, Handler, Interceptor, MemoryDuplicateChecker, MessageMatcher, RouteError,
        Router, RouterBuilder, RuleContext, handler_fn, interceptor_fn,
    };

    // Messages and collaborators
    pub use courier_core::{
        ApiError, BoxedClient, BoxedSession, ErrorHandler, HandlerError, HandlerResult,
        InMessage, OutMessage, ServiceClient, SessionManager,
    };

    pub use courier_core::async_trait;
}
