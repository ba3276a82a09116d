//! Dependency initialization and wiring for the restaurant API.

use std::sync::Arc;

use restaurant_search_repository::opensearch::IndexConfig;
use restaurant_search_repository::{
    OpenSearchProvider, RestaurantIndexProvider, RestaurantSearchService,
    RestaurantSearchServiceConfig, SearchIndexError,
};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::config::connection::EngineConnector;
use crate::config::ApiConfig;
use crate::StartupError;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The service shared by every request handler.
    pub service: Arc<RestaurantSearchService>,
}

impl Dependencies {
    /// Connect to OpenSearch and build the service.
    ///
    /// Blocks until the engine answers a ping, retrying with backoff. Returns
    /// early only if `shutdown` fires first.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(StartupError::ConnectionAborted)` - If shutdown was requested while connecting
    pub async fn new(
        config: &ApiConfig,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<Self, StartupError> {
        info!(
            opensearch_url = %config.opensearch_url,
            index = %config.index_name,
            retry_initial_ms = config.retry_policy.initial_interval.as_millis() as u64,
            retry_max_ms = config.retry_policy.max_interval.as_millis() as u64,
            "Initializing dependencies"
        );

        let url = config.opensearch_url.clone();
        let index_config = IndexConfig::new(config.index_name.clone());

        let connector = EngineConnector::new(config.retry_policy.clone());
        let provider = connector
            .connect(
                || {
                    let url = url.clone();
                    let index_config = index_config.clone();
                    async move {
                        let provider = OpenSearchProvider::new(&url, index_config)?;
                        provider.ping().await?;
                        Ok::<_, SearchIndexError>(provider)
                    }
                },
                shutdown,
            )
            .await?;

        Ok(Self::from_provider(Arc::new(provider), config.service.clone()).await)
    }

    /// Build the service around an already connected provider and make sure
    /// the index exists.
    ///
    /// Schema initialization is fail-open: a failure is logged and the service
    /// is returned anyway.
    pub async fn from_provider(
        provider: Arc<dyn RestaurantIndexProvider>,
        service_config: RestaurantSearchServiceConfig,
    ) -> Self {
        let service = RestaurantSearchService::with_config(provider, service_config);

        if let Err(e) = service.ensure_schema().await {
            warn!(error = %e, "Could not ensure restaurant index exists, continuing startup");
        }

        Self {
            service: Arc::new(service),
        }
    }
}
