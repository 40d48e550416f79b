use dnscache_domain::ResolveError;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Resolved values shared between the store and every caller they are
/// handed to.
pub type Addresses = Arc<Vec<String>>;

/// Snapshot of one cache entry as returned by [`CacheStore::get`].
///
/// `values` and `failure` may both be set: a negative entry keeps the last
/// successful values alongside the failure that replaced them.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub values: Option<Addresses>,
    pub failure: Option<ResolveError>,
    pub expire_at: Instant,
}

impl CacheEntry {
    pub fn is_fresh_at(&self, now: Instant) -> bool {
        now < self.expire_at
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Instant::now())
    }

    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.expire_at.saturating_duration_since(now)
    }

    pub fn is_negative(&self) -> bool {
        self.failure.is_some()
    }
}

/// Concurrency-safe key to entry table with mark-sweep eviction.
pub trait CacheStore: Send + Sync {
    /// Returns the entry for `key` and marks it used. `None` means the key is
    /// absent, which is distinct from a present entry with no values.
    fn get(&self, key: &str) -> Option<CacheEntry>;

    /// Unconditionally replaces the entry for `key`; it expires `ttl` from now
    /// and counts as used.
    fn set(
        &self,
        key: &str,
        values: Option<Addresses>,
        failure: Option<ResolveError>,
        ttl: Duration,
    );

    /// Removes every entry not used since the previous sweep, clears the used
    /// flag of the survivors and returns how many entries were removed.
    fn prune(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
