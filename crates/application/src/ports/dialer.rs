use async_trait::async_trait;
use dnscache_domain::ResolveError;
use tokio::net::TcpStream;

use crate::context::LookupContext;

/// Raw connection primitive used once addresses are known.
#[async_trait]
pub trait Dialer: Send + Sync {
    /// Connects to `address` (`host:port`, `ip:port` or `[ipv6]:port`).
    async fn dial(&self, ctx: &LookupContext, address: &str) -> Result<TcpStream, ResolveError>;
}
