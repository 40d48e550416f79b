use dnscache_application::ports::CacheStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Background job that periodically mark-sweeps the lookup cache.
pub struct EvictionJob {
    cache: Arc<dyn CacheStore>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl EvictionJob {
    pub fn new(cache: Arc<dyn CacheStore>, interval: Duration) -> Self {
        Self {
            cache,
            interval,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Spawns the sweep loop. The first sweep happens one interval from now.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "Starting cache eviction job"
        );

        tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + self.interval, self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("EvictionJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let removed = self.cache.prune();
                        debug!(removed, remaining = self.cache.len(), "Eviction sweep completed");
                    }
                }
            }
        })
    }
}
