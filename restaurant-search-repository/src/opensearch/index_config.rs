//! OpenSearch index configuration and mappings.
//!
//! This module defines the index settings and mappings for the restaurant index.

use serde_json::{json, Value};

/// The default name of the restaurant index.
pub const INDEX_NAME: &str = "restaurants";

/// Spatial index precision for `delivery_area`.
pub const DELIVERY_AREA_PRECISION: &str = "1m";

/// Configuration for the search index.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// The index name used for all operations.
    pub name: String,
}

impl IndexConfig {
    /// Create a new index configuration.
    ///
    /// # Arguments
    ///
    /// * `name` - The index name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new(INDEX_NAME)
    }
}

/// Get the index settings and mappings for the restaurant index.
///
/// The configuration includes:
/// - **geo_shape**: `delivery_area`, quadtree prefix index at meter precision
/// - **integer**: `rating` and `price`
/// - **boolean**: `open`
/// - **text**: every other field, including `tags` and `food_tags`
///
/// # Sharding Configuration
///
/// - 1 primary shard
/// - 1 replica for redundancy
pub fn get_index_settings() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "mappings": {
            "properties": {
                "id": { "type": "text" },
                "name": { "type": "text" },
                "url": { "type": "text" },
                "image_url": { "type": "text" },
                "address": { "type": "text" },
                "tags": { "type": "text" },
                "food_tags": { "type": "text" },
                "open": { "type": "boolean" },
                "rating": { "type": "integer" },
                "price": { "type": "integer" },
                "delivery_area": {
                    "type": "geo_shape",
                    "tree": "quadtree",
                    "precision": DELIVERY_AREA_PRECISION
                }
            }
        }
    })
}
