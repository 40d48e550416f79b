use dnscache_domain::ResolverStats;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

#[derive(Default)]
#[repr(align(64))]
pub struct LookupMetrics {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
}

impl LookupMetrics {
    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, AtomicOrdering::Relaxed);
    }

    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, AtomicOrdering::Relaxed);
    }

    pub fn snapshot(&self) -> ResolverStats {
        ResolverStats {
            cache_hits: self.hits.load(AtomicOrdering::Relaxed),
            cache_misses: self.misses.load(AtomicOrdering::Relaxed),
        }
    }

    pub fn hit_rate(&self) -> f64 {
        self.snapshot().hit_rate()
    }
}
