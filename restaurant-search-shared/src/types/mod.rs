//! This module defines the core data structures used across the restaurant search.
//! It re-exports the document, query and result types.

pub mod restaurant;
pub mod search_query;
pub mod search_result;

pub use restaurant::{DeliveryArea, Position, Restaurant};
pub use search_query::{GeoPoint, GeoSearchQuery};
pub use search_result::SearchResult;
