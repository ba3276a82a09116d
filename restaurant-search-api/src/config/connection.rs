//! Engine connection state machine.
//!
//! The API does not serve traffic until the engine has answered once. The
//! connector moves `Disconnected -> Connecting -> Ready`, sleeping with
//! exponential backoff between failed attempts. A shutdown signal interrupts
//! it at any point and leaves it in `Aborted`.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use restaurant_search_repository::SearchIndexError;
use tokio::sync::broadcast;
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::Retry;
use tracing::{debug, info, warn};

use crate::StartupError;

/// Where the connector is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No attempt in flight; either not started or backing off after a failure.
    Disconnected,
    /// Attempt number `attempt` (1-based) is in flight.
    Connecting { attempt: u32 },
    /// The engine answered; the handle is ready to share.
    Ready,
    /// A shutdown signal arrived before the engine became ready.
    Aborted,
}

/// Exponential backoff between connection attempts, doubling from
/// `initial_interval` up to `max_interval`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl RetryPolicy {
    pub fn new(initial_interval: Duration, max_interval: Duration) -> Self {
        Self {
            initial_interval,
            max_interval,
        }
    }

    /// The delays between attempts. Never ends.
    ///
    /// `ExponentialBackoff` yields `factor * base^n` milliseconds, so a base of
    /// 2 with half the initial interval as factor doubles from the initial
    /// interval.
    pub fn strategy(&self) -> ExponentialBackoff {
        let half_initial_ms = (self.initial_interval.as_millis() / 2).max(1) as u64;
        ExponentialBackoff::from_millis(2)
            .factor(half_initial_ms)
            .max_delay(self.max_interval)
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let index = attempt.saturating_sub(1) as usize;
        self.strategy().nth(index).unwrap_or(self.max_interval)
    }
}

/// Drives connection attempts until one succeeds or shutdown is requested.
#[derive(Debug)]
pub struct EngineConnector {
    policy: RetryPolicy,
    state: Mutex<ConnectionState>,
}

impl EngineConnector {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(ConnectionState::Disconnected),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, next: ConnectionState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(from = ?*state, to = ?next, "Engine connection state change");
        *state = next;
    }

    /// Call `attempt` until it returns `Ok`, backing off between failures.
    ///
    /// There is no attempt limit. The only way out besides success is a message
    /// on `shutdown` (or its sender being dropped), which yields
    /// `StartupError::ConnectionAborted`.
    ///
    /// # Arguments
    ///
    /// * `attempt` - Builds a handle and checks it can reach the engine
    /// * `shutdown` - Shutdown signal receiver
    pub async fn connect<P, F, Fut>(
        &self,
        mut attempt: F,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<P, StartupError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<P, SearchIndexError>>,
    {
        let attempts = AtomicU32::new(0);

        let action = || {
            let attempt_number = attempts.fetch_add(1, Ordering::SeqCst).saturating_add(1);
            self.transition(ConnectionState::Connecting {
                attempt: attempt_number,
            });
            let pending = attempt();

            async move {
                let result = pending.await;
                if let Err(e) = &result {
                    self.transition(ConnectionState::Disconnected);
                    warn!(
                        attempt = attempt_number,
                        error = %e,
                        retry_in_ms = self.policy.delay_for(attempt_number).as_millis() as u64,
                        "Failed to connect to search engine, retrying..."
                    );
                }
                result
            }
        };

        let result = tokio::select! {
            biased;
            _ = shutdown.recv() => {
                return self.abort();
            }
            result = Retry::spawn(self.policy.strategy(), action) => result,
        };

        let handle = result?;
        self.transition(ConnectionState::Ready);
        info!(
            attempts = attempts.load(Ordering::SeqCst),
            "Search engine connection established"
        );
        Ok(handle)
    }

    fn abort<P>(&self) -> Result<P, StartupError> {
        self.transition(ConnectionState::Aborted);
        info!("Shutdown requested while connecting to search engine");
        Err(StartupError::ConnectionAborted)
    }
}
