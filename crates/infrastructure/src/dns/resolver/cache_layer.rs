use super::super::cache::LookupMetrics;
use super::inflight::InflightGroup;
use dnscache_application::ports::{Addresses, CacheEntry, CacheStore, LookupHooks, UpstreamResolver};
use dnscache_application::LookupContext;
use dnscache_domain::{ResolveError, ResolverConfig, ResolverStats};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Which upstream operation fills a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Host,
    Addr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub ttl: Duration,
    pub fail_ttl: Duration,
    pub auto_refresh: bool,
    pub persist_on_failure: bool,
}

impl CachePolicy {
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self {
            ttl: config.cache_ttl(),
            fail_ttl: config.cache_fail_ttl(),
            auto_refresh: config.auto_refresh,
            persist_on_failure: config.persist_on_failure,
        }
    }

    fn wants_refresh(&self, remaining: Duration) -> bool {
        self.auto_refresh && !self.ttl.is_zero() && remaining < self.ttl / 2
    }

    /// Values a fresh entry may serve directly. A negative entry serves its
    /// previous values only when stale fallback is on.
    fn servable(&self, entry: &CacheEntry) -> Option<Addresses> {
        match (&entry.failure, &entry.values) {
            (None, Some(values)) => Some(Arc::clone(values)),
            (Some(_), Some(values)) if self.persist_on_failure => Some(Arc::clone(values)),
            _ => None,
        }
    }
}

/// Reports whether two address lists differ as multisets; order is ignored.
pub fn addresses_changed(previous: &[String], current: &[String]) -> bool {
    if previous.len() != current.len() {
        return true;
    }

    let mut previous: Vec<&str> = previous.iter().map(String::as_str).collect();
    let mut current: Vec<&str> = current.iter().map(String::as_str).collect();
    previous.sort_unstable();
    current.sort_unstable();
    previous != current
}

/// Cache-aside lookup pipeline shared by forward and reverse lookups.
///
/// Fresh entries are served without waiting, misses go through the
/// single-flight group so one upstream call serves every concurrent caller.
#[derive(Clone)]
pub struct CachedLookup {
    upstream: Arc<dyn UpstreamResolver>,
    cache: Arc<dyn CacheStore>,
    inflight: Arc<InflightGroup<Addresses>>,
    metrics: Arc<LookupMetrics>,
    hooks: LookupHooks,
    policy: CachePolicy,
}

impl CachedLookup {
    pub fn new(
        upstream: Arc<dyn UpstreamResolver>,
        cache: Arc<dyn CacheStore>,
        hooks: LookupHooks,
        policy: CachePolicy,
    ) -> Self {
        Self {
            upstream,
            cache,
            inflight: Arc::new(InflightGroup::new()),
            metrics: Arc::new(LookupMetrics::default()),
            hooks,
            policy,
        }
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    pub fn stats(&self) -> ResolverStats {
        self.metrics.snapshot()
    }

    pub async fn lookup(
        &self,
        ctx: &LookupContext,
        kind: LookupKind,
        key: &str,
    ) -> Result<Addresses, ResolveError> {
        if let Some(values) = self.check_cache(ctx, kind, key) {
            self.metrics.record_hit();
            debug!(key, "Cache HIT");
            return Ok(values);
        }

        self.metrics.record_miss();
        debug!(key, "Cache MISS");

        let (result, shared) = self
            .inflight
            .run(ctx, key, || self.fetch(ctx, kind, key, false))
            .await;

        if shared {
            debug!(key, "Joined in-flight lookup");
        }
        result
    }

    fn check_cache(&self, ctx: &LookupContext, kind: LookupKind, key: &str) -> Option<Addresses> {
        let entry = self.cache.get(key)?;
        let now = Instant::now();
        if !entry.is_fresh_at(now) {
            return None;
        }

        let values = self.policy.servable(&entry)?;
        if self.policy.wants_refresh(entry.remaining_at(now)) {
            self.spawn_refresh(ctx, kind, key);
        }
        Some(values)
    }

    fn spawn_refresh(&self, ctx: &LookupContext, kind: LookupKind, key: &str) {
        if self.inflight.is_inflight(key) {
            return;
        }

        let this = self.clone();
        let ctx = ctx.detached();
        let key = key.to_string();
        tokio::spawn(async move {
            debug!(key = %key, "Background refresh");
            let (result, _) = this
                .inflight
                .run(&ctx, &key, || this.fetch(&ctx, kind, &key, true))
                .await;
            if let Err(e) = result {
                debug!(key = %key, error = %e, "Background refresh failed");
            }
        });
    }

    /// The coordinated part of a lookup; runs at most once per key at a time.
    ///
    /// A plain lookup re-checks the cache first since a previous leader may
    /// have filled it while this caller was queued. A refresh re-checks too,
    /// and only fetches while the entry is still inside its refresh window.
    async fn fetch(
        &self,
        ctx: &LookupContext,
        kind: LookupKind,
        key: &str,
        refresh: bool,
    ) -> Result<Addresses, ResolveError> {
        let previous = self.cache.get(key);
        let now = Instant::now();
        let fresh = previous.as_ref().filter(|e| e.is_fresh_at(now));

        if refresh {
            if let Some(entry) = fresh {
                if let Some(values) = self.policy.servable(entry) {
                    if !self.policy.wants_refresh(entry.remaining_at(now)) {
                        debug!(key, "Entry already refreshed");
                        return Ok(values);
                    }
                }
            }
        } else if let Some(entry) = fresh {
            if let Some(values) = self.policy.servable(entry) {
                return Ok(values);
            }
            if let Some(failure) = &entry.failure {
                debug!(key, "Negative cache HIT");
                return Err(failure.clone());
            }
        }

        // A refresh never replaces a still-valid positive entry with a failure.
        let keep_on_failure = refresh && fresh.is_some_and(|e| !e.is_negative());
        let previous = previous.and_then(|entry| entry.values);

        self.hooks.cache_miss(key);
        if let Some(trace) = ctx.trace() {
            trace.fetch_started(key);
        }

        let result = match kind {
            LookupKind::Host => self.upstream.lookup_host(ctx, key).await,
            LookupKind::Addr => self.upstream.lookup_addr(ctx, key).await,
        };

        if let Some(trace) = ctx.trace() {
            trace.fetch_finished(key, result.as_ref().map(Vec::as_slice));
        }

        match result {
            Ok(values) => {
                let values: Addresses = Arc::new(values);
                let prev = previous.as_deref().map_or(&[][..], Vec::as_slice);
                let changed = addresses_changed(prev, &values);

                self.cache
                    .set(key, Some(Arc::clone(&values)), None, self.policy.ttl);

                if changed {
                    self.notify_change(key, &values);
                }
                Ok(values)
            }
            Err(e) if e.is_cancellation() => Err(e),
            Err(e) if keep_on_failure => {
                warn!(key, error = %e, "Background refresh failed, keeping cached values");
                Err(e)
            }
            Err(e) => {
                warn!(key, error = %e, "Upstream lookup failed");
                self.cache
                    .set(key, previous.clone(), Some(e.clone()), self.policy.fail_ttl);

                match previous {
                    Some(values) if self.policy.persist_on_failure => {
                        debug!(key, "Serving stale values");
                        Ok(values)
                    }
                    _ => Err(e),
                }
            }
        }
    }

    fn notify_change(&self, key: &str, values: &Addresses) {
        let Some(hook) = self.hooks.on_change.as_ref() else {
            return;
        };

        debug!(key, count = values.len(), "Addresses changed");
        let hook = Arc::clone(hook);
        let key = key.to_string();
        let values = Arc::clone(values);
        tokio::spawn(async move {
            hook(&key, &values);
        });
    }
}
