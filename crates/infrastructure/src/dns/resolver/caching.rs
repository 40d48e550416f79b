use super::super::dial::{join_host_port, split_host_port, AddressOrderer};
use super::cache_layer::{CachedLookup, LookupKind};
use async_trait::async_trait;
use dnscache_application::ports::{CacheStore, Dialer, UpstreamResolver};
use dnscache_application::LookupContext;
use dnscache_domain::{IpFamily, ResolveError, ResolverConfig, ResolverStats};
use std::net::IpAddr;
use std::sync::{Arc, Once};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Caching resolver and failover dialer.
///
/// Built by [`ResolverBuilder`](super::ResolverBuilder). Dropping it stops
/// the background eviction job.
pub struct CachingResolver {
    config: ResolverConfig,
    upstream: Arc<dyn UpstreamResolver>,
    dialer: Arc<dyn Dialer>,
    lookup: CachedLookup,
    orderer: AddressOrderer,
    family: IpFamily,
    shutdown: CancellationToken,
    stop_once: Once,
}

impl CachingResolver {
    pub(super) fn new(
        config: ResolverConfig,
        upstream: Arc<dyn UpstreamResolver>,
        dialer: Arc<dyn Dialer>,
        lookup: CachedLookup,
        family: IpFamily,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            orderer: AddressOrderer::new(config.dial_strategy),
            config,
            upstream,
            dialer,
            lookup,
            family,
            shutdown,
            stop_once: Once::new(),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The backing store, for pre-seeding or inspection.
    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        self.lookup.cache()
    }

    pub fn stats(&self) -> ResolverStats {
        self.lookup.stats()
    }

    /// Resolves `host` to address strings. An IP literal resolves to itself
    /// when it belongs to the resolver's address family.
    pub async fn lookup_host(
        &self,
        ctx: &LookupContext,
        host: &str,
    ) -> Result<Vec<String>, ResolveError> {
        if self.config.disabled {
            return self.upstream.lookup_host(ctx, host).await;
        }
        if let Ok(ip) = host.parse::<IpAddr>() {
            if !self.family.matches(&ip) {
                return Err(ResolveError::NotFound {
                    host: host.to_string(),
                });
            }
            return Ok(vec![ip.to_string()]);
        }

        let values = self.lookup.lookup(ctx, LookupKind::Host, host).await?;
        Ok(values.to_vec())
    }

    /// Resolves `addr` to host names.
    pub async fn lookup_addr(
        &self,
        ctx: &LookupContext,
        addr: &str,
    ) -> Result<Vec<String>, ResolveError> {
        if self.config.disabled {
            return self.upstream.lookup_addr(ctx, addr).await;
        }

        let values = self.lookup.lookup(ctx, LookupKind::Addr, addr).await?;
        Ok(values.to_vec())
    }

    /// Typed addresses of `family`, taken from the cached forward lookup in
    /// cache order.
    pub async fn lookup_ip(
        &self,
        ctx: &LookupContext,
        family: IpFamily,
        host: &str,
    ) -> Result<Vec<IpAddr>, ResolveError> {
        if self.config.disabled {
            return self.upstream.lookup_ip(ctx, family, host).await;
        }

        let addresses = CachingResolver::lookup_host(self, ctx, host).await?;
        Ok(family.filter(addresses.iter().map(String::as_str)))
    }

    /// Connects to `address` (`host:port`), trying every resolved address in
    /// dial-strategy order until one accepts.
    pub async fn dial(&self, ctx: &LookupContext, address: &str) -> Result<TcpStream, ResolveError> {
        if self.config.disabled {
            return self.dialer.dial(ctx, address).await;
        }

        let (host, port) = split_host_port(address)?;
        let addresses = CachingResolver::lookup_host(self, ctx, host).await?;
        if addresses.is_empty() {
            return Err(ResolveError::NoAddresses {
                address: address.to_string(),
            });
        }

        let mut last_err = None;
        for ip in self.orderer.order(&addresses) {
            let target = join_host_port(&ip, port);
            match self.dialer.dial(ctx, &target).await {
                Ok(stream) => return Ok(stream),
                Err(e) => {
                    debug!(address, target = %target, error = %e, "Dial attempt failed, trying next");
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| ResolveError::NoAddresses {
            address: address.to_string(),
        }))
    }

    /// Sweeps the cache on demand when `prune_unused` is set; returns how
    /// many entries were removed.
    pub fn refresh(&self, prune_unused: bool) -> usize {
        if !prune_unused {
            return 0;
        }
        let removed = self.lookup.cache().prune();
        debug!(removed, "Manual cache sweep");
        removed
    }

    /// Stops the eviction job. Further calls are no-ops.
    pub fn stop(&self) {
        self.stop_once.call_once(|| {
            debug!("Stopping resolver background jobs");
            self.shutdown.cancel();
        });
    }
}

impl Drop for CachingResolver {
    fn drop(&mut self) {
        self.stop();
    }
}

#[async_trait]
impl UpstreamResolver for CachingResolver {
    async fn lookup_host(
        &self,
        ctx: &LookupContext,
        host: &str,
    ) -> Result<Vec<String>, ResolveError> {
        CachingResolver::lookup_host(self, ctx, host).await
    }

    async fn lookup_addr(
        &self,
        ctx: &LookupContext,
        addr: &str,
    ) -> Result<Vec<String>, ResolveError> {
        CachingResolver::lookup_addr(self, ctx, addr).await
    }

    async fn lookup_ip(
        &self,
        ctx: &LookupContext,
        family: IpFamily,
        host: &str,
    ) -> Result<Vec<IpAddr>, ResolveError> {
        CachingResolver::lookup_ip(self, ctx, family, host).await
    }
}
