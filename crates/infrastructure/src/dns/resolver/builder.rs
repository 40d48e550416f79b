use super::super::cache::MemoryCacheStore;
use super::super::dial::TcpDialer;
use super::super::upstream::{EndpointResolver, FamilyResolver, SystemResolver};
use super::cache_layer::{CachePolicy, CachedLookup};
use super::caching::CachingResolver;
use crate::jobs::EvictionJob;
use dnscache_application::ports::{CacheStore, Dialer, LookupHooks, UpstreamResolver};
use dnscache_domain::{ConfigError, IpFamily, ResolverConfig};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Assembles a [`CachingResolver`].
///
/// Upstream precedence: an explicit upstream, then the configured fixed
/// endpoint, then the system resolver. `build` must run inside a Tokio
/// runtime when a cleanup interval is configured.
pub struct ResolverBuilder {
    config: ResolverConfig,
    upstream: Option<Arc<dyn UpstreamResolver>>,
    dialer: Option<Arc<dyn Dialer>>,
    cache: Option<Arc<dyn CacheStore>>,
    hooks: LookupHooks,
    family: IpFamily,
}

impl ResolverBuilder {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            upstream: None,
            dialer: None,
            cache: None,
            hooks: LookupHooks::default(),
            family: IpFamily::Any,
        }
    }

    pub fn with_upstream(mut self, upstream: Arc<dyn UpstreamResolver>) -> Self {
        self.upstream = Some(upstream);
        self
    }

    pub fn with_dialer(mut self, dialer: Arc<dyn Dialer>) -> Self {
        self.dialer = Some(dialer);
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_hooks(mut self, hooks: LookupHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn on_cache_miss<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.hooks.on_cache_miss = Some(Arc::new(hook));
        self
    }

    pub fn on_change<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, &[String]) + Send + Sync + 'static,
    {
        self.hooks.on_change = Some(Arc::new(hook));
        self
    }

    /// Restricts forward lookups to one address family.
    pub fn with_family(mut self, family: IpFamily) -> Self {
        self.family = family;
        self
    }

    pub fn build(self) -> Result<CachingResolver, ConfigError> {
        self.config.validate()?;

        let upstream: Arc<dyn UpstreamResolver> = match (self.upstream, self.config.endpoint()?) {
            (Some(upstream), _) => upstream,
            (None, Some(endpoint)) => {
                info!(endpoint = %endpoint, "Using fixed resolver endpoint");
                Arc::new(EndpointResolver::new(endpoint, self.config.query_timeout()))
            }
            (None, None) => Arc::new(SystemResolver::new(self.config.query_timeout())),
        };

        let upstream: Arc<dyn UpstreamResolver> = match self.family {
            IpFamily::Any => upstream,
            family => Arc::new(FamilyResolver::new(upstream, family)),
        };

        let dialer: Arc<dyn Dialer> = match self.dialer {
            Some(dialer) => dialer,
            None => Arc::new(TcpDialer::new(self.config.dial_timeout())),
        };
        let cache: Arc<dyn CacheStore> = match self.cache {
            Some(cache) => cache,
            None => Arc::new(MemoryCacheStore::new()),
        };

        let policy = CachePolicy::from_config(&self.config);
        let lookup = CachedLookup::new(Arc::clone(&upstream), Arc::clone(&cache), self.hooks, policy);

        let shutdown = CancellationToken::new();
        if !self.config.disabled {
            if let Some(interval) = self.config.cleanup_interval() {
                let job = EvictionJob::new(cache, interval).with_cancellation(shutdown.clone());
                Arc::new(job).start();
            }
        }

        info!(
            disabled = self.config.disabled,
            ttl_ms = policy.ttl.as_millis() as u64,
            fail_ttl_ms = policy.fail_ttl.as_millis() as u64,
            auto_refresh = policy.auto_refresh,
            persist_on_failure = policy.persist_on_failure,
            dial_strategy = self.config.dial_strategy.as_str(),
            family = %self.family,
            "Caching resolver built"
        );

        Ok(CachingResolver::new(
            self.config,
            upstream,
            dialer,
            lookup,
            self.family,
            shutdown,
        ))
    }
}
