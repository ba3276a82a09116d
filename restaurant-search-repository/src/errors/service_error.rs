//! Service-level error types.

use thiserror::Error;

use super::SearchIndexError;

/// Errors returned by `RestaurantSearchService`.
///
/// Validation failures (`InvalidInput`, `MissingLocation`) are raised before any
/// engine call. Engine failures are wrapped according to the operation that hit
/// them and are never retried inside a request.
#[derive(Debug, Clone, Error)]
pub enum RestaurantServiceError {
    /// The ingestion payload could not be accepted.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A search request did not carry both `lat` and `lng`.
    #[error("Missing location: both lat and lng are required")]
    MissingLocation,

    /// The engine rejected or failed the bulk upsert.
    #[error("Ingestion failed: {0}")]
    IngestionFailed(#[source] SearchIndexError),

    /// The engine rejected or failed the search query.
    #[error("Query failed: {0}")]
    QueryFailed(#[source] SearchIndexError),

    /// The boot-time index check or creation failed or timed out.
    #[error("Schema initialization failed: {0}")]
    SchemaInitFailed(String),
}

impl RestaurantServiceError {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a schema initialization error.
    pub fn schema_init(msg: impl Into<String>) -> Self {
        Self::SchemaInitFailed(msg.into())
    }
}
