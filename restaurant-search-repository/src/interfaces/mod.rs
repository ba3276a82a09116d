//! Interface definitions for the search engine provider.
//!
//! This module defines the abstract `RestaurantIndexProvider` trait so the
//! service can be wired to OpenSearch in production and to fakes in tests.

mod search_index_provider;

pub use search_index_provider::RestaurantIndexProvider;
