//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `RestaurantIndexProvider`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use opensearch::{
    http::{
        request::JsonBody,
        response::Response,
        transport::{SingleNodeConnectionPool, TransportBuilder},
    },
    indices::{IndicesCreateParts, IndicesExistsParts},
    BulkParts, OpenSearch, SearchParts,
};
use restaurant_search_shared::Restaurant;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::RestaurantIndexProvider;
use crate::opensearch::index_config::{get_index_settings, IndexConfig};
use crate::query::{RestaurantQuery, SearchRequestBody};

/// Error type OpenSearch reports when a concurrent creator won the race.
const ALREADY_EXISTS_ERROR: &str = "resource_already_exists_exception";

/// How many item failures to include in a bulk error message.
const MAX_REPORTED_ITEM_FAILURES: usize = 5;

/// OpenSearch provider implementation.
///
/// Wraps a single `OpenSearch` client. The client is cheap to share, pools its
/// own connections and is safe to use from many tasks at once.
///
/// # Example
///
/// ```ignore
/// use restaurant_search_repository::opensearch::{IndexConfig, OpenSearchProvider};
///
/// let provider = OpenSearchProvider::new("http://localhost:9200", IndexConfig::default())?;
/// provider.ping().await?;
/// provider.ensure_index_exists().await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
    index_config: IndexConfig,
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    errors: bool,
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source", default)]
    source: Value,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider for the specified URL.
    ///
    /// No request is made here; use `ping` to check reachability.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `index_config` - The index configuration
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If the URL is invalid or the transport cannot be built
    pub fn new(url: &str, index_config: IndexConfig) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            index = %index_config.name,
            "Created OpenSearch provider"
        );

        Ok(Self {
            client,
            index_config,
        })
    }

    /// The index this provider operates on.
    pub fn index_name(&self) -> &str {
        &self.index_config.name
    }

    /// Build the NDJSON body of a bulk request: one `index` action keyed by
    /// `id`, followed by the document source, per restaurant.
    fn bulk_body(restaurants: &[Restaurant]) -> Result<Vec<JsonBody<Value>>, SearchIndexError> {
        let mut body = Vec::with_capacity(restaurants.len() * 2);
        for restaurant in restaurants {
            body.push(JsonBody::new(json!({ "index": { "_id": restaurant.id } })));
            body.push(JsonBody::new(serde_json::to_value(restaurant)?));
        }
        Ok(body)
    }

    /// Body of the `_search` request for `query`.
    fn search_body(query: &RestaurantQuery, size: usize) -> SearchRequestBody<'_> {
        SearchRequestBody { size, query }
    }

    /// Collect `"<id>: <type>: <reason>"` for failed items of a bulk response.
    fn failed_item_reasons(items: &[Value]) -> Vec<String> {
        items
            .iter()
            .filter_map(|item| item.as_object()?.values().next())
            .filter_map(|result| {
                let error = result.get("error")?;
                let id = result.get("_id").and_then(Value::as_str).unwrap_or("?");
                let kind = error.get("type").and_then(Value::as_str).unwrap_or("unknown");
                let reason = error.get("reason").and_then(Value::as_str).unwrap_or("");
                Some(format!("{}: {}: {}", id, kind, reason))
            })
            .collect()
    }

    /// Turn a non-success response into an error message, logging the body.
    async fn failure_body(response: Response, operation: &str) -> String {
        let status = response.status_code();
        let body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %body, "{} request failed", operation);
        format!("{} failed with status {}: {}", operation, status, body)
    }
}

#[async_trait]
impl RestaurantIndexProvider for OpenSearchProvider {
    async fn ping(&self) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .ping()
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            let message = Self::failure_body(response, "Ping").await;
            return Err(SearchIndexError::connection(message));
        }

        Ok(())
    }

    /// Check for the index and create it from `get_index_settings` when absent.
    ///
    /// A creation that loses a race against another creator is treated as success.
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError> {
        let index = self.index_config.name.as_str();

        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::index_creation(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => {
                debug!(index = %index, "Index already exists");
                return Ok(());
            }
            404 => {}
            status => {
                return Err(SearchIndexError::index_creation(format!(
                    "Unexpected status {} checking index {}",
                    status, index
                )));
            }
        }

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(get_index_settings())
            .send()
            .await
            .map_err(|e| SearchIndexError::index_creation(e.to_string()))?;

        if !response.status_code().is_success() {
            let message = Self::failure_body(response, "Create index").await;
            if message.contains(ALREADY_EXISTS_ERROR) {
                info!(index = %index, "Index was created concurrently");
                return Ok(());
            }
            return Err(SearchIndexError::index_creation(message));
        }

        info!(index = %index, "Created index");
        Ok(())
    }

    async fn bulk_upsert_documents(
        &self,
        restaurants: &[Restaurant],
    ) -> Result<(), SearchIndexError> {
        let body = Self::bulk_body(restaurants)?;

        let response = self
            .client
            .bulk(BulkParts::Index(&self.index_config.name))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::bulk_index(e.to_string()))?;

        if !response.status_code().is_success() {
            let message = Self::failure_body(response, "Bulk").await;
            return Err(SearchIndexError::bulk_index(message));
        }

        let bulk: BulkResponse = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        if bulk.errors {
            let failures = Self::failed_item_reasons(&bulk.items);
            warn!(
                failed = failures.len(),
                total = restaurants.len(),
                "Bulk request reported item failures"
            );
            return Err(SearchIndexError::bulk_index(format!(
                "{} of {} documents failed: {}",
                failures.len(),
                restaurants.len(),
                failures
                    .iter()
                    .take(MAX_REPORTED_ITEM_FAILURES)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join("; ")
            )));
        }

        debug!(count = restaurants.len(), "Documents upserted");
        Ok(())
    }

    async fn search_documents(
        &self,
        query: &RestaurantQuery,
        size: usize,
    ) -> Result<Vec<Value>, SearchIndexError> {
        let index = self.index_config.name.as_str();

        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(Self::search_body(query, size))
            .send()
            .await
            .map_err(|e| SearchIndexError::search(e.to_string()))?;

        if !response.status_code().is_success() {
            let message = Self::failure_body(response, "Search").await;
            return Err(SearchIndexError::search(message));
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        debug!(hits = search.hits.hits.len(), "Search completed");
        Ok(search.hits.hits.into_iter().map(|hit| hit.source).collect())
    }
}
