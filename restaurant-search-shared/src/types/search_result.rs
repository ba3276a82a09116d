//! Search result types for the restaurant search.

use serde::{Deserialize, Serialize};

use super::restaurant::Restaurant;

/// Search response envelope.
///
/// The wire key is `Restaurants`. Order follows the engine's relevance ranking.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    #[serde(rename = "Restaurants")]
    pub restaurants: Vec<Restaurant>,
}

impl SearchResult {
    pub fn new(restaurants: Vec<Restaurant>) -> Self {
        Self { restaurants }
    }

    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }

    pub fn len(&self) -> usize {
        self.restaurants.len()
    }
}
