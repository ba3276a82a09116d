//! # Restaurant Search Repository
//!
//! This crate provides the contract between the restaurant API and the search
//! engine. It includes the provider trait, the structured query DSL, a concrete
//! OpenSearch implementation and the service that validates requests before
//! they reach the engine.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod query;
pub mod service;
pub mod utils;

pub use config::RestaurantSearchServiceConfig;
pub use errors::{RestaurantServiceError, SearchIndexError};
pub use interfaces::RestaurantIndexProvider;
pub use opensearch::OpenSearchProvider;
pub use query::RestaurantQuery;
pub use service::RestaurantSearchService;
pub use utils::{decode_hits, DecodedHits};
