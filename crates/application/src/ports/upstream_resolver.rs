use async_trait::async_trait;
use dnscache_domain::{IpFamily, ResolveError};
use std::net::IpAddr;

use crate::context::LookupContext;

/// The name-resolution capability the cache sits in front of.
///
/// Implementations must honour the context: a canceled or expired context
/// yields `ResolveError::Canceled` / `DeadlineExceeded`, never a resolution
/// failure, so the caller can tell the two apart.
#[async_trait]
pub trait UpstreamResolver: Send + Sync {
    /// Forward lookup: host name to address strings, in resolver order.
    async fn lookup_host(&self, ctx: &LookupContext, host: &str)
        -> Result<Vec<String>, ResolveError>;

    /// Reverse lookup: address to host names.
    async fn lookup_addr(&self, ctx: &LookupContext, addr: &str)
        -> Result<Vec<String>, ResolveError>;

    /// Forward lookup restricted to one address family.
    async fn lookup_ip(
        &self,
        ctx: &LookupContext,
        family: IpFamily,
        host: &str,
    ) -> Result<Vec<IpAddr>, ResolveError>;
}
