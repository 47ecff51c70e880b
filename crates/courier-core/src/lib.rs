//! # Courier Core
//!
//! Shared vocabulary of the Courier router:
//!
//! - **Messages**: the inbound [`InMessage`] and the outbound [`OutMessage`]
//!   with one builder per reply kind.
//! - **Errors**: the recoverable [`ApiError`] and the [`HandlerError`] that
//!   interceptors and handlers return.
//! - **Collaborators**: [`ServiceClient`], [`SessionManager`] and
//!   [`ErrorHandler`], passed through the router untouched.
//!
//! ```text
//! ┌────────────┐     ┌────────┐     ┌──────────────────────────┐
//! │  Webhook   │────▶│ Router │────▶│ Rule: interceptors ──▶   │──▶ OutMessage
//! │ InMessage  │     │        │────▶│       handlers           │
//! └────────────┘     └────────┘     └──────────────────────────┘
//! ```

pub mod collaborator;
pub mod error;
pub mod message;
pub mod reply;

pub use collaborator::{
    BoxedClient, BoxedErrorHandler, BoxedSession, ErrorHandler, LogErrorHandler, NoopClient,
    NoopSession, ServiceClient, SessionManager,
};
pub use error::{ApiError, ApiResult, BoxError, HandlerError, HandlerResult};
pub use message::InMessage;
pub use reply::{Article, OutBody, OutMessage, ReplyBuilder};

// Needed to implement the async capability traits.
pub use async_trait::async_trait;
