//! Restaurant search service implementation.
//!
//! This module provides the service the transport layer calls into. It validates
//! requests, builds engine queries and maps engine failures onto
//! `RestaurantServiceError`. All persistence happens in the engine; the service
//! holds no state of its own beyond the shared provider handle.

use std::sync::Arc;

use restaurant_search_shared::{GeoSearchQuery, Restaurant, SearchResult};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::config::RestaurantSearchServiceConfig;
use crate::errors::RestaurantServiceError;
use crate::interfaces::RestaurantIndexProvider;
use crate::query::RestaurantQuery;
use crate::utils::decode_hits;

/// The main service for ingesting and searching restaurants.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use restaurant_search_repository::RestaurantSearchService;
/// use restaurant_search_repository::opensearch::{IndexConfig, OpenSearchProvider};
/// use restaurant_search_shared::GeoSearchQuery;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = OpenSearchProvider::new("http://localhost:9200", IndexConfig::default())?;
/// let service = RestaurantSearchService::new(Arc::new(provider));
///
/// let result = service.search(&GeoSearchQuery::new("pizza", "0.5", "0.5")).await?;
/// println!("{} restaurants deliver here", result.len());
/// # Ok(())
/// # }
/// ```
pub struct RestaurantSearchService {
    provider: Arc<dyn RestaurantIndexProvider>,
    config: RestaurantSearchServiceConfig,
}

impl RestaurantSearchService {
    /// Create a new service with default configuration.
    pub fn new(provider: Arc<dyn RestaurantIndexProvider>) -> Self {
        Self {
            provider,
            config: RestaurantSearchServiceConfig::default(),
        }
    }

    /// Create a new service with custom configuration.
    pub fn with_config(
        provider: Arc<dyn RestaurantIndexProvider>,
        config: RestaurantSearchServiceConfig,
    ) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &RestaurantSearchServiceConfig {
        &self.config
    }

    /// Make sure the restaurant index exists, bounded by `schema_init_timeout`.
    ///
    /// Intended to run once at boot. Callers are expected to log a failure and
    /// carry on; a genuinely broken schema surfaces later as ingestion or query
    /// failures.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index exists or was created
    /// * `Err(RestaurantServiceError::SchemaInitFailed)` - If the check or creation
    ///   failed or did not finish in time
    pub async fn ensure_schema(&self) -> Result<(), RestaurantServiceError> {
        let window = self.config.schema_init_timeout;

        match timeout(window, self.provider.ensure_index_exists()).await {
            Ok(Ok(())) => {
                info!("Restaurant index is ready");
                Ok(())
            }
            Ok(Err(e)) => Err(RestaurantServiceError::schema_init(e.to_string())),
            Err(_) => Err(RestaurantServiceError::schema_init(format!(
                "timed out after {}ms",
                window.as_millis()
            ))),
        }
    }

    /// Insert or overwrite a batch of restaurants, keyed by `id`.
    ///
    /// The batch goes to the engine as one bulk request. An empty batch is
    /// accepted without contacting the engine.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If every restaurant was indexed
    /// * `Err(RestaurantServiceError::InvalidInput)` - If the batch exceeds `max_batch_size`
    /// * `Err(RestaurantServiceError::IngestionFailed)` - If the engine failed the bulk request
    ///
    /// # Note
    ///
    /// Failure is all-or-nothing from the caller's point of view. Retrying a
    /// failed batch is safe because upserts by `id` are idempotent.
    #[instrument(skip(self, restaurants), fields(count = restaurants.len()))]
    pub async fn ingest(&self, restaurants: Vec<Restaurant>) -> Result<(), RestaurantServiceError> {
        if let Some(max) = self.config.max_batch_size {
            if restaurants.len() > max {
                return Err(RestaurantServiceError::invalid_input(format!(
                    "Batch size {} exceeds maximum {}",
                    restaurants.len(),
                    max
                )));
            }
        }

        if restaurants.is_empty() {
            debug!("Empty batch, nothing to index");
            return Ok(());
        }

        self.provider
            .bulk_upsert_documents(&restaurants)
            .await
            .map_err(RestaurantServiceError::IngestionFailed)?;

        info!(count = restaurants.len(), "Restaurants indexed");
        Ok(())
    }

    /// Find restaurants matching `query.q` that deliver to `(query.lat, query.lng)`.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchResult)` - Decoded hits in engine ranking order, possibly empty
    /// * `Err(RestaurantServiceError::MissingLocation)` - If `lat` or `lng` is absent or empty
    /// * `Err(RestaurantServiceError::QueryFailed)` - If the engine failed the query
    ///
    /// # Note
    ///
    /// Hits that fail to decode are dropped from the result and logged, so the
    /// result can be shorter than the number of engine matches.
    #[instrument(skip(self, query), fields(q = %query.q))]
    pub async fn search(
        &self,
        query: &GeoSearchQuery,
    ) -> Result<SearchResult, RestaurantServiceError> {
        let point = query
            .location()
            .ok_or(RestaurantServiceError::MissingLocation)?;

        let engine_query = RestaurantQuery::geo_text(query.q.clone(), point);

        let sources = self
            .provider
            .search_documents(&engine_query, self.config.result_size)
            .await
            .map_err(RestaurantServiceError::QueryFailed)?;

        let hits = sources.len();
        let decoded = decode_hits(sources);
        if decoded.skipped > 0 {
            warn!(
                hits = hits,
                skipped = decoded.skipped,
                "Some search hits could not be decoded"
            );
        }

        debug!(returned = decoded.restaurants.len(), "Search completed");
        Ok(SearchResult::new(decoded.restaurants))
    }
}
