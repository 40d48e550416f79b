use compact_str::CompactString;
use dashmap::DashMap;
use dnscache_application::ports::{Addresses, CacheEntry, CacheStore};
use dnscache_domain::ResolveError;
use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::time::{Duration, Instant};
use tracing::debug;

const DEFAULT_SHARD_AMOUNT: usize = 16;

struct CachedSlot {
    values: Option<Addresses>,
    failure: Option<ResolveError>,
    expire_at: Instant,
    used: AtomicBool,
}

/// In-memory [`CacheStore`] with two-generation mark-sweep eviction.
///
/// Reads only take a shard read lock and flip `used` atomically while holding
/// it. A sweep takes the shard write lock per shard, so a reader marking an
/// entry and a sweep deciding its fate never interleave.
pub struct MemoryCacheStore {
    entries: DashMap<CompactString, CachedSlot, FxBuildHasher>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_capacity_and_hasher_and_shard_amount(
                0,
                FxBuildHasher,
                DEFAULT_SHARD_AMOUNT,
            ),
        }
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        let slot = self.entries.get(key)?;
        slot.used.store(true, AtomicOrdering::Relaxed);
        Some(CacheEntry {
            values: slot.values.clone(),
            failure: slot.failure.clone(),
            expire_at: slot.expire_at,
        })
    }

    fn set(
        &self,
        key: &str,
        values: Option<Addresses>,
        failure: Option<ResolveError>,
        ttl: Duration,
    ) {
        let now = Instant::now();
        let expire_at = now.checked_add(ttl).unwrap_or(now);
        self.entries.insert(
            CompactString::from(key),
            CachedSlot {
                values,
                failure,
                expire_at,
                used: AtomicBool::new(true),
            },
        );
    }

    fn prune(&self) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, slot| {
            if slot.used.swap(false, AtomicOrdering::Relaxed) {
                true
            } else {
                removed += 1;
                false
            }
        });

        debug!(removed, remaining = self.entries.len(), "Cache sweep finished");
        removed
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
