//! # Courier Runtime
//!
//! Ambient services around the router:
//!
//! - [`config`]: figment-based layered configuration (defaults, files,
//!   `COURIER_*` environment variables)
//! - [`logging`]: `tracing-subscriber` setup driven by the configuration
//! - [`router_builder`]: a [`RouterBuilder`](courier_router::RouterBuilder)
//!   preset with the configured worker pool and duplicate window
//!
//! ```ignore
//! use courier_runtime::{ConfigLoader, bootstrap, router_builder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = bootstrap(ConfigLoader::new())?;
//!     let router = router_builder(&config.router)
//!         .rule()
//!         .handler(AuditLog)
//!         .end()
//!         .build()?;
//!
//!     let reply = router.route(message).await?;
//!     router.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod assembly;
pub mod config;
pub mod error;
pub mod logging;

pub use assembly::{bootstrap, router_builder};
pub use config::{ConfigError, ConfigLoader, ConfigResult, CourierConfig, load_config};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for handler code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
