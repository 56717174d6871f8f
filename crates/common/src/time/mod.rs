//! Time abstraction for testability
//!
//! State tokens carry wall-clock timestamps, so expiry logic reads the time
//! through [`Clock`]. Production code uses [`SystemClock`]; tests drive a
//! [`MockClock`] forward instead of sleeping.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use ssogate_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::new();
//! let start = clock.millis_since_epoch();
//! clock.advance(Duration::from_secs(5));
//! assert_eq!(clock.millis_since_epoch() - start, 5_000);
//! ```

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Trait for time operations to enable testing
pub trait Clock: Send + Sync {
    /// Get current system time (wall clock)
    fn system_time(&self) -> SystemTime;

    /// Milliseconds since the UNIX epoch.
    fn millis_since_epoch(&self) -> u64 {
        self.system_time().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
    }

    /// Whole seconds since the UNIX epoch.
    fn seconds_since_epoch(&self) -> i64 {
        self.system_time().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64
    }
}

/// Real system clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Mock clock for deterministic testing
///
/// Clones share the same elapsed offset, so a clock handed to a service can
/// still be advanced by the test that created it.
#[derive(Debug, Clone)]
pub struct MockClock {
    base_system_time: SystemTime,
    elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Create a mock clock starting at the current real time.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(SystemTime::now())
    }

    /// Create a mock clock starting at a fixed instant.
    #[must_use]
    pub fn starting_at(base_system_time: SystemTime) -> Self {
        Self { base_system_time, elapsed: Arc::new(Mutex::new(Duration::ZERO)) }
    }

    /// Advance the mock clock by a duration
    pub fn advance(&self, duration: Duration) {
        *self.elapsed.lock() += duration;
    }

    /// Set the elapsed offset to an absolute value
    pub fn set_elapsed(&self, duration: Duration) {
        *self.elapsed.lock() = duration;
    }

    /// How much time has been simulated since creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn system_time(&self) -> SystemTime {
        self.base_system_time + *self.elapsed.lock()
    }
}
