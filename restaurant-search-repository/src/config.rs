//! Configuration types for the RestaurantSearchService.

use std::time::Duration;

/// Default number of hits returned by a search.
pub const DEFAULT_RESULT_SIZE: usize = 10;

/// Default window for the boot-time index check.
pub const DEFAULT_SCHEMA_INIT_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration for the RestaurantSearchService.
#[derive(Debug, Clone)]
pub struct RestaurantSearchServiceConfig {
    /// Maximum number of restaurants accepted in a single ingestion batch.
    ///
    /// `None` disables the limit, which is the default.
    pub max_batch_size: Option<usize>,

    /// Number of hits requested from the engine per search.
    pub result_size: usize,

    /// How long `ensure_schema` waits on the engine before giving up.
    pub schema_init_timeout: Duration,
}

impl Default for RestaurantSearchServiceConfig {
    fn default() -> Self {
        Self {
            max_batch_size: None,
            result_size: DEFAULT_RESULT_SIZE,
            schema_init_timeout: DEFAULT_SCHEMA_INIT_TIMEOUT,
        }
    }
}

impl RestaurantSearchServiceConfig {
    /// Limit ingestion batches to `max` restaurants.
    pub fn with_max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = Some(max);
        self
    }

    /// Set the number of hits requested per search.
    pub fn with_result_size(mut self, size: usize) -> Self {
        self.result_size = size;
        self
    }

    /// Set the boot-time index check window.
    pub fn with_schema_init_timeout(mut self, timeout: Duration) -> Self {
        self.schema_init_timeout = timeout;
        self
    }
}
