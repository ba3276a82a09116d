//! # Restaurant Search API
//!
//! HTTP API for registering restaurants and searching them by free text within
//! a point's delivery coverage. All storage and query execution is delegated to
//! an OpenSearch cluster.
//!
//! ## Architecture
//!
//! 1. **Config**: Reads the environment and connects to the engine
//! 2. **Server**: Routes `POST /restaurants` and `GET /search` onto the service
//! 3. **Service**: Validates requests and talks to the engine (see
//!    `restaurant_search_repository`)
//!
//! ## Modules
//!
//! - [`config`]: Configuration, engine connection and dependency wiring
//! - [`errors`]: HTTP error mapping
//! - [`server`]: Axum router, handlers and shared state

pub mod config;
pub mod errors;
pub mod server;

pub use config::{ApiConfig, Dependencies};
pub use errors::ApiError;

use thiserror::Error;

/// Errors that can stop the API from starting or keep it from serving.
#[derive(Error, Debug)]
pub enum StartupError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A shutdown signal arrived before the engine connection was ready.
    #[error("Engine connection aborted by shutdown signal")]
    ConnectionAborted,

    /// The engine could not be reached and retrying gave up.
    #[error("Search engine unavailable: {0}")]
    EngineUnavailable(#[from] restaurant_search_repository::SearchIndexError),

    /// Failed to bind or run the HTTP server.
    #[error("Server error: {0}")]
    ServerError(#[from] std::io::Error),
}

impl StartupError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
