//! Search engine provider trait definition.
//!
//! This module defines the contract the service relies on from the external
//! document-search engine.

use async_trait::async_trait;
use restaurant_search_shared::Restaurant;
use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::query::RestaurantQuery;

/// Abstracts the underlying search engine (OpenSearch, Elasticsearch, etc.).
///
/// Implementations are shared process-wide behind an `Arc` and must be safe for
/// concurrent use. They own their connection pooling; callers never lock them.
///
/// All methods return `Result<T, SearchIndexError>` for consistent error handling
/// across backends.
#[async_trait]
pub trait RestaurantIndexProvider: Send + Sync {
    /// Check that the engine is reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the engine answered
    /// * `Err(SearchIndexError::ConnectionError)` - If it did not
    async fn ping(&self) -> Result<(), SearchIndexError>;

    /// Ensure the restaurant index exists with the expected mapping, creating it
    /// if necessary. A no-op when the index is already present.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index is ready for use
    /// * `Err(SearchIndexError)` - If the existence check or the creation fails
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError>;

    /// Insert or overwrite every restaurant, keyed by its `id`, in one round trip.
    ///
    /// Failure is coarse: any transport error or item failure fails the whole call.
    ///
    /// # Arguments
    ///
    /// * `restaurants` - The documents to upsert
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the engine accepted every document
    /// * `Err(SearchIndexError::BulkIndexError)` - Otherwise
    async fn bulk_upsert_documents(&self, restaurants: &[Restaurant])
        -> Result<(), SearchIndexError>;

    /// Execute a query against the restaurant index.
    ///
    /// # Arguments
    ///
    /// * `query` - The compound query to run
    /// * `size` - Maximum number of hits to return
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Value>)` - The raw `_source` payload of each hit, in ranking order
    /// * `Err(SearchIndexError)` - If the engine rejected or failed the query
    async fn search_documents(
        &self,
        query: &RestaurantQuery,
        size: usize,
    ) -> Result<Vec<Value>, SearchIndexError>;
}
