//! OpenSearch implementation of the search engine provider.
//!
//! This module provides a concrete implementation of `RestaurantIndexProvider`
//! using OpenSearch as the backend.

mod index_config;
mod provider;

pub use index_config::{get_index_settings, IndexConfig, DELIVERY_AREA_PRECISION, INDEX_NAME};
pub use provider::OpenSearchProvider;
