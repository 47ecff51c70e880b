//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{CourierConfig, DedupConfig, LogOutput, LoggingConfig, RouterConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &CourierConfig) -> ConfigResult<()> {
    validate_router_config(&config.router)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_router_config(router: &RouterConfig) -> ConfigResult<()> {
    if router.worker_pool_size == 0 {
        return Err(ConfigError::validation(
            "router.worker_pool_size must be greater than 0",
        ));
    }

    validate_dedup_config(&router.dedup)
}

fn validate_dedup_config(dedup: &DedupConfig) -> ConfigResult<()> {
    // A disabled checker is never built, so its numbers do not matter.
    if !dedup.enabled {
        return Ok(());
    }

    if dedup.ttl_secs == 0 {
        return Err(ConfigError::validation(
            "router.dedup.ttl_secs must be greater than 0",
        ));
    }

    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when logging.output is \"file\"",
        ));
    }

    Ok(())
}
