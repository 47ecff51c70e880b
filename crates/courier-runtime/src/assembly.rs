//! Assembly of a router from configuration.

use tracing::info;

use crate::config::{ConfigLoader, CourierConfig, RouterConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging;
use courier_router::{MemoryDuplicateChecker, RouterBuilder};

/// Returns a router builder preset from `config`.
///
/// Rules and collaborators are added by the caller.
pub fn router_builder(config: &RouterConfig) -> RouterBuilder {
    let builder = RouterBuilder::new().worker_pool_size(config.worker_pool_size);

    if config.dedup.enabled {
        builder.duplicate_checker(MemoryDuplicateChecker::new(
            config.dedup.ttl(),
            config.dedup.clear_interval(),
        ))
    } else {
        builder
    }
}

/// Loads and validates the configuration, then installs the logger.
///
/// ```rust,ignore
/// let config = courier_runtime::bootstrap(ConfigLoader::new())?;
/// let router = courier_runtime::router_builder(&config.router)
///     .rule()
///     .handler(Greeting)
///     .end()
///     .build()?;
/// ```
pub fn bootstrap(loader: ConfigLoader) -> RuntimeResult<CourierConfig> {
    let config = loader.load()?;
    validate_config(&config)?;
    logging::init_from_config(&config.logging);

    info!(
        worker_pool_size = config.router.worker_pool_size,
        dedup = config.router.dedup.enabled,
        "Courier runtime configured"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;
    use courier_core::{InMessage, OutMessage};
    use courier_router::handler_fn;

    fn echo_router(config: &RouterConfig) -> courier_router::Router {
        router_builder(config)
            .rule()
            .r#async(false)
            .handler(handler_fn(|_, _| {
                Ok(Some(OutMessage::text().content("ok").build()))
            }))
            .end()
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn dedup_follows_config() {
        let message = InMessage::new().with_msg_id(1);

        let router = echo_router(&RouterConfig::default());
        assert!(router.route(message.clone()).await.unwrap().is_some());
        assert!(router.route(message.clone()).await.unwrap().is_none());

        let mut config = RouterConfig::default();
        config.dedup.enabled = false;
        let router = echo_router(&config);
        assert!(router.route(message.clone()).await.unwrap().is_some());
        assert!(router.route(message).await.unwrap().is_some());
    }

    #[test]
    fn bootstrap_rejects_invalid_config() {
        let mut config = CourierConfig::default();
        config.router.worker_pool_size = 0;

        let result = bootstrap(ConfigLoader::new().without_env().merge(config));
        assert!(matches!(result, Err(RuntimeError::Config(_))));
    }
}
