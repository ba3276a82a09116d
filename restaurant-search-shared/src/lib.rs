//! # Restaurant Search Shared
//!
//! This crate defines the data structures shared across the restaurant search
//! workspace: the `Restaurant` document, the geo-search query parameters and
//! the search result envelope.

pub mod types;

pub use types::restaurant::{DeliveryArea, Position, Restaurant};
pub use types::search_query::{GeoPoint, GeoSearchQuery};
pub use types::search_result::SearchResult;
