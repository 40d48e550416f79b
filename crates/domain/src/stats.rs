use serde::Serialize;

/// Point-in-time copy of the resolver's cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolverStats {
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl ResolverStats {
    pub fn total(&self) -> u64 {
        self.cache_hits + self.cache_misses
    }

    /// Hit rate in percent, 0.0 when nothing has been looked up yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.total();
        if total > 0 {
            (self.cache_hits as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }
}
