//! Periodic purge of abandoned state records.
//!
//! Authorize requests that never come back leave records behind. The
//! sweeper runs on its own tokio task, independent of validation, and holds
//! the store only for the duration of one `retain` pass.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use std::time::Duration;
//! # use ssogate_core::state::{StateStore, StateSweeper, SweeperError};
//! # async fn example(store: Arc<StateStore>) -> Result<(), SweeperError> {
//! let mut sweeper = StateSweeper::new(store, Duration::from_secs(60));
//! sweeper.start()?;
//! // ... application runs ...
//! sweeper.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::store::StateStore;

const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Sweeper lifecycle errors
#[derive(Debug, Error)]
pub enum SweeperError {
    #[error("State sweeper already running")]
    AlreadyRunning,

    #[error("State sweeper not running")]
    NotRunning,

    #[error("State sweeper did not stop within {seconds}s")]
    Timeout { seconds: u64 },

    #[error("State sweeper task failed: {0}")]
    TaskJoinFailed(String),
}

/// Background task calling [`StateStore::purge_expired`] on a fixed interval.
pub struct StateSweeper {
    store: Arc<StateStore>,
    interval: Duration,
    cancellation: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl StateSweeper {
    pub fn new(store: Arc<StateStore>, interval: Duration) -> Self {
        Self { store, interval, cancellation: CancellationToken::new(), handle: None }
    }

    /// Spawn the sweep loop. Must be called inside a tokio runtime.
    ///
    /// # Errors
    /// [`SweeperError::AlreadyRunning`] if started twice.
    pub fn start(&mut self) -> Result<(), SweeperError> {
        if self.is_running() {
            return Err(SweeperError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();
        let cancel = self.cancellation.clone();
        let store = Arc::clone(&self.store);
        let period = self.interval;

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately; skip it so the first sweep
            // happens one full interval after start.
            ticker.tick().await;

            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let purged = store.purge_expired();
                        debug!(purged, remaining = store.len(), "State sweep complete");
                    }
                }
            }
        }));

        info!(interval_secs = self.interval.as_secs(), "State sweeper started");
        Ok(())
    }

    /// Cancel the loop and wait for the task to exit.
    ///
    /// # Errors
    /// [`SweeperError::NotRunning`] if not started, or a timeout/join error.
    pub async fn stop(&mut self) -> Result<(), SweeperError> {
        let Some(handle) = self.handle.take() else {
            return Err(SweeperError::NotRunning);
        };

        self.cancellation.cancel();
        tokio::time::timeout(JOIN_TIMEOUT, handle)
            .await
            .map_err(|_| SweeperError::Timeout { seconds: JOIN_TIMEOUT.as_secs() })?
            .map_err(|e| SweeperError::TaskJoinFailed(e.to_string()))?;

        info!("State sweeper stopped");
        Ok(())
    }

    pub const fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for StateSweeper {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}
