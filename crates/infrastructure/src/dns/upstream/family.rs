use async_trait::async_trait;
use dnscache_application::ports::UpstreamResolver;
use dnscache_application::LookupContext;
use dnscache_domain::{IpFamily, ResolveError};
use std::net::IpAddr;
use std::sync::Arc;

/// Restricts an upstream to a single address family.
///
/// Forward lookups only ever return addresses of `family`; a host without
/// any is reported as not found. Reverse lookups pass through untouched.
pub struct FamilyResolver {
    inner: Arc<dyn UpstreamResolver>,
    family: IpFamily,
}

impl FamilyResolver {
    pub fn new(inner: Arc<dyn UpstreamResolver>, family: IpFamily) -> Self {
        Self { inner, family }
    }

    pub fn v4_only(inner: Arc<dyn UpstreamResolver>) -> Self {
        Self::new(inner, IpFamily::V4)
    }

    pub fn v6_only(inner: Arc<dyn UpstreamResolver>) -> Self {
        Self::new(inner, IpFamily::V6)
    }

    pub fn family(&self) -> IpFamily {
        self.family
    }
}

#[async_trait]
impl UpstreamResolver for FamilyResolver {
    async fn lookup_host(
        &self,
        ctx: &LookupContext,
        host: &str,
    ) -> Result<Vec<String>, ResolveError> {
        let ips = self.inner.lookup_ip(ctx, self.family, host).await?;
        let ips = self.family.filter_ips(ips);
        if ips.is_empty() {
            return Err(ResolveError::NotFound {
                host: host.to_string(),
            });
        }
        Ok(ips.iter().map(IpAddr::to_string).collect())
    }

    async fn lookup_addr(
        &self,
        ctx: &LookupContext,
        addr: &str,
    ) -> Result<Vec<String>, ResolveError> {
        self.inner.lookup_addr(ctx, addr).await
    }

    async fn lookup_ip(
        &self,
        ctx: &LookupContext,
        family: IpFamily,
        host: &str,
    ) -> Result<Vec<IpAddr>, ResolveError> {
        let ips = self.inner.lookup_ip(ctx, self.family, host).await?;
        let ips = family.filter_ips(self.family.filter_ips(ips));
        if ips.is_empty() {
            return Err(ResolveError::NotFound {
                host: host.to_string(),
            });
        }
        Ok(ips)
    }
}
