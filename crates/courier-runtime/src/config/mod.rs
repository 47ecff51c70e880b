//! Configuration for the Courier runtime.
//!
//! Layered loading through figment, a serde schema with defaults for every
//! field, and a validation pass run before the router is assembled.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{
    CourierConfig, DedupConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, RouterConfig,
    SpanEventConfig,
};
pub use validation::validate_config;

/// Loads the configuration from the default locations and validates it.
pub fn load_config() -> ConfigResult<CourierConfig> {
    let config = ConfigLoader::new().load()?;
    validate_config(&config)?;
    Ok(config)
}
