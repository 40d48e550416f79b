use super::endpoint::EndpointResolver;
use async_trait::async_trait;
use dnscache_application::ports::UpstreamResolver;
use dnscache_application::LookupContext;
use dnscache_domain::{parse_endpoint, IpFamily, ResolveError};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tracing::{debug, warn};

const RESOLV_CONF_PATH: &str = "/etc/resolv.conf";

/// Platform resolver.
///
/// Forward lookups go through the operating system (`getaddrinfo`), which
/// honours `/etc/hosts` and NSS. Reverse lookups are sent to the first
/// `nameserver` listed in `/etc/resolv.conf`.
pub struct SystemResolver {
    reverse: Option<EndpointResolver>,
}

impl SystemResolver {
    pub fn new(query_timeout: Duration) -> Self {
        let nameserver = match std::fs::read_to_string(RESOLV_CONF_PATH) {
            Ok(contents) => nameservers(&contents).into_iter().next(),
            Err(e) => {
                warn!(path = RESOLV_CONF_PATH, error = %e, "Cannot read resolver configuration");
                None
            }
        };

        Self::with_nameserver(nameserver, query_timeout)
    }

    pub fn with_nameserver(nameserver: Option<SocketAddr>, query_timeout: Duration) -> Self {
        debug!(nameserver = ?nameserver, "System resolver ready");
        Self {
            reverse: nameserver.map(|addr| EndpointResolver::new(addr, query_timeout)),
        }
    }
}

/// Nameservers listed in a `resolv.conf`, in file order.
pub fn nameservers(contents: &str) -> Vec<SocketAddr> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && !line.starts_with(';'))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some("nameserver"), Some(addr)) => {
                    // Strip a zone index (fe80::1%eth0); the socket address
                    // parser does not take it.
                    let addr = addr.split('%').next().unwrap_or(addr);
                    parse_endpoint(addr).ok()
                }
                _ => None,
            }
        })
        .collect()
}

#[async_trait]
impl UpstreamResolver for SystemResolver {
    async fn lookup_host(
        &self,
        ctx: &LookupContext,
        host: &str,
    ) -> Result<Vec<String>, ResolveError> {
        let resolved = ctx
            .run(async {
                tokio::net::lookup_host((host, 0))
                    .await
                    .map_err(|e| ResolveError::resolution(host, e))
            })
            .await?;

        let mut addresses: Vec<String> = Vec::new();
        for addr in resolved {
            let ip = addr.ip().to_string();
            if !addresses.contains(&ip) {
                addresses.push(ip);
            }
        }

        if addresses.is_empty() {
            return Err(ResolveError::NotFound {
                host: host.to_string(),
            });
        }
        Ok(addresses)
    }

    async fn lookup_addr(
        &self,
        ctx: &LookupContext,
        addr: &str,
    ) -> Result<Vec<String>, ResolveError> {
        match &self.reverse {
            Some(reverse) => reverse.lookup_addr(ctx, addr).await,
            None => Err(ResolveError::resolution(addr, "no nameserver configured")),
        }
    }

    async fn lookup_ip(
        &self,
        ctx: &LookupContext,
        family: IpFamily,
        host: &str,
    ) -> Result<Vec<IpAddr>, ResolveError> {
        let addresses = self.lookup_host(ctx, host).await?;
        let ips = family.filter(addresses.iter().map(String::as_str));
        if ips.is_empty() {
            return Err(ResolveError::NotFound {
                host: host.to_string(),
            });
        }
        Ok(ips)
    }
}
