//! Error types for the restaurant search repository.
//!
//! `SearchIndexError` covers failures talking to the search engine.
//! `RestaurantServiceError` is what the service hands back to the transport layer.

mod search_index_error;
mod service_error;

pub use search_index_error::SearchIndexError;
pub use service_error::RestaurantServiceError;
