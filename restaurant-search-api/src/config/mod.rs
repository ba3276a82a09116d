//! Configuration, engine connection and dependency wiring for the API.

pub mod connection;
pub mod dependencies;

pub use connection::{ConnectionState, EngineConnector, RetryPolicy};
pub use dependencies::Dependencies;

use std::env;
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use restaurant_search_repository::config::{DEFAULT_RESULT_SIZE, DEFAULT_SCHEMA_INIT_TIMEOUT};
use restaurant_search_repository::opensearch::INDEX_NAME;
use restaurant_search_repository::RestaurantSearchServiceConfig;
use tracing::warn;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default listen address.
const DEFAULT_SERVER_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
const DEFAULT_SERVER_PORT: u16 = 9000;

/// Default first retry delay for the engine connection, in milliseconds.
const DEFAULT_RETRY_INITIAL_MS: u64 = 500;

/// Default upper bound for the retry delay, in milliseconds.
const DEFAULT_RETRY_MAX_MS: u64 = 30_000;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// Read `LOG_FORMAT` ("json" or anything else for pretty output).
    pub fn from_env() -> Self {
        Self::parse(env::var("LOG_FORMAT").ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Runtime configuration for the API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub opensearch_url: String,
    pub index_name: String,
    pub server_host: IpAddr,
    pub server_port: u16,
    pub retry_policy: RetryPolicy,
    pub service: RestaurantSearchServiceConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `INDEX_NAME`: Restaurant index name (default: "restaurants")
    /// - `SERVER_HOST`: Listen address (default: 0.0.0.0)
    /// - `SERVER_PORT`: Listen port (default: 9000)
    /// - `SCHEMA_INIT_TIMEOUT_MS`: Boot-time index check window (default: 1000)
    /// - `OPENSEARCH_RETRY_INITIAL_MS`: First reconnect delay (default: 500)
    /// - `OPENSEARCH_RETRY_MAX_MS`: Reconnect delay cap (default: 30000)
    /// - `MAX_BATCH_SIZE`: Largest accepted ingestion batch (default: unlimited)
    /// - `SEARCH_RESULT_SIZE`: Hits returned per search (default: 10)
    ///
    /// Invalid values are logged and replaced with the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let retry_initial = parse_or(&lookup, "OPENSEARCH_RETRY_INITIAL_MS", DEFAULT_RETRY_INITIAL_MS);
        let retry_max = parse_or(&lookup, "OPENSEARCH_RETRY_MAX_MS", DEFAULT_RETRY_MAX_MS);
        let schema_timeout_ms = parse_or(
            &lookup,
            "SCHEMA_INIT_TIMEOUT_MS",
            DEFAULT_SCHEMA_INIT_TIMEOUT.as_millis() as u64,
        );

        let mut service = RestaurantSearchServiceConfig::default()
            .with_result_size(parse_or(&lookup, "SEARCH_RESULT_SIZE", DEFAULT_RESULT_SIZE))
            .with_schema_init_timeout(Duration::from_millis(schema_timeout_ms));
        if let Some(max) = parse_optional::<usize, _>(&lookup, "MAX_BATCH_SIZE") {
            service = service.with_max_batch_size(max);
        }

        Self {
            opensearch_url: lookup("OPENSEARCH_URL")
                .unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string()),
            index_name: lookup("INDEX_NAME").unwrap_or_else(|| INDEX_NAME.to_string()),
            server_host: parse_or(&lookup, "SERVER_HOST", DEFAULT_SERVER_HOST),
            server_port: parse_or(&lookup, "SERVER_PORT", DEFAULT_SERVER_PORT),
            retry_policy: RetryPolicy::new(
                Duration::from_millis(retry_initial),
                Duration::from_millis(retry_max.max(retry_initial)),
            ),
            service,
        }
    }

    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_host, self.server_port)
    }
}

fn parse_optional<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key = key, value = %raw, error = %e, "Ignoring invalid configuration value");
            None
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    parse_optional(lookup, key).unwrap_or(default)
}
