//! In-memory state record store

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use ssogate_common::Clock;
use tracing::debug;

/// Data bound to an issued state token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecureStateRecord {
    pub provider_id: String,
    /// State supplied by the client, returned untouched after the callback
    pub client_state: String,
    /// Callback URI sent to the provider with this token
    pub redirect_uri: Option<String>,
    /// Issue time in milliseconds since the Unix epoch
    pub created_at_ms: u64,
}

/// Concurrent map of outstanding state records keyed by full token.
///
/// `take` is an atomic remove, so two validations racing on one token see
/// exactly one record.
pub struct StateStore {
    records: DashMap<String, SecureStateRecord>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl StateStore {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { records: DashMap::new(), clock, ttl }
    }

    pub fn insert(&self, token: String, record: SecureStateRecord) {
        self.records.insert(token, record);
    }

    /// Remove and return the record for `token`.
    pub fn take(&self, token: &str) -> Option<SecureStateRecord> {
        self.records.remove(token).map(|(_, record)| record)
    }

    pub fn remove(&self, token: &str) {
        self.records.remove(token);
    }

    pub fn contains(&self, token: &str) -> bool {
        self.records.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current time according to the store's clock, in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.clock.millis_since_epoch()
    }

    /// Drop every record older than the TTL. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.now_ms();
        let ttl_ms = u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX);
        let before = self.records.len();
        self.records.retain(|_, record| now.saturating_sub(record.created_at_ms) <= ttl_ms);
        let purged = before.saturating_sub(self.records.len());
        if purged > 0 {
            debug!(purged, remaining = self.records.len(), "Purged expired state records");
        }
        purged
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("records", &self.records.len())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
