//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;
use courier_router::BuildError;

/// Errors raised while bringing a router up from configuration.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Loading or validating the configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The rule set could not be frozen.
    #[error("Failed to build router: {0}")]
    Build(#[from] BuildError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
