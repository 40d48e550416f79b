use super::message::{build_query, parse_answer, reverse_name};
use async_trait::async_trait;
use dnscache_application::ports::UpstreamResolver;
use dnscache_application::LookupContext;
use dnscache_domain::{IpFamily, ResolveError};
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::RecordType;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// Resolver talking plain DNS over UDP to one fixed server.
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    server: SocketAddr,
    timeout: Duration,
}

impl EndpointResolver {
    pub fn new(server: SocketAddr, timeout: Duration) -> Self {
        Self { server, timeout }
    }

    pub fn server(&self) -> SocketAddr {
        self.server
    }

    async fn query(
        &self,
        ctx: &LookupContext,
        host: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<String>, ResolveError> {
        ctx.run(async {
            tokio::time::timeout(self.timeout, self.exchange(host, name, record_type))
                .await
                .map_err(|_| {
                    ResolveError::resolution(host, format!("i/o timeout querying {}", self.server))
                })?
        })
        .await
    }

    async fn exchange(
        &self,
        host: &str,
        name: &str,
        record_type: RecordType,
    ) -> Result<Vec<String>, ResolveError> {
        let (id, bytes) = build_query(name, record_type)?;

        let bind_addr: SocketAddr = if self.server.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let socket = UdpSocket::bind(bind_addr).await.map_err(|e| {
            ResolveError::resolution(host, format!("failed to bind UDP socket: {}", e))
        })?;

        socket.send_to(&bytes, self.server).await.map_err(|e| {
            ResolveError::resolution(host, format!("failed to send query to {}: {}", self.server, e))
        })?;

        let mut buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        loop {
            let (len, from) = socket.recv_from(&mut buf).await.map_err(|e| {
                ResolveError::resolution(
                    host,
                    format!("failed to read response from {}: {}", self.server, e),
                )
            })?;

            if from.ip() != self.server.ip() {
                warn!(expected = %self.server, received_from = %from, "UDP response from unexpected source");
                continue;
            }

            let answer = match parse_answer(&buf[..len], record_type) {
                Ok(answer) => answer,
                Err(e) => return Err(ResolveError::resolution(host, e)),
            };
            if answer.id != id {
                debug!(expected = id, received = answer.id, "Ignoring response with mismatched id");
                continue;
            }

            return match answer.rcode {
                ResponseCode::NoError => Ok(answer.values),
                ResponseCode::NXDomain => Err(ResolveError::NotFound {
                    host: host.to_string(),
                }),
                rcode => Err(ResolveError::resolution(
                    host,
                    format!("server {} answered {}", self.server, rcode),
                )),
            };
        }
    }
}

#[async_trait]
impl UpstreamResolver for EndpointResolver {
    async fn lookup_host(
        &self,
        ctx: &LookupContext,
        host: &str,
    ) -> Result<Vec<String>, ResolveError> {
        let (v4, v6) = tokio::join!(
            self.query(ctx, host, host, RecordType::A),
            self.query(ctx, host, host, RecordType::AAAA),
        );

        match (v4, v6) {
            (Ok(mut v4), Ok(v6)) => {
                v4.extend(v6);
                if v4.is_empty() {
                    return Err(ResolveError::NotFound {
                        host: host.to_string(),
                    });
                }
                Ok(v4)
            }
            (Err(e), _) | (_, Err(e)) if e.is_cancellation() => Err(e),
            (Ok(found), Err(e)) | (Err(e), Ok(found)) => {
                if found.is_empty() {
                    return Err(e);
                }
                debug!(host, error = %e, "One address family failed");
                Ok(found)
            }
            (Err(e), Err(_)) => Err(e),
        }
    }

    async fn lookup_addr(
        &self,
        ctx: &LookupContext,
        addr: &str,
    ) -> Result<Vec<String>, ResolveError> {
        let ip: IpAddr = addr
            .parse()
            .map_err(|_| ResolveError::malformed(addr, "unrecognized address"))?;

        let names = self.query(ctx, addr, &reverse_name(&ip), RecordType::PTR).await?;
        if names.is_empty() {
            return Err(ResolveError::NotFound {
                host: addr.to_string(),
            });
        }
        Ok(names)
    }

    async fn lookup_ip(
        &self,
        ctx: &LookupContext,
        family: IpFamily,
        host: &str,
    ) -> Result<Vec<IpAddr>, ResolveError> {
        let addresses = match family {
            IpFamily::Any => self.lookup_host(ctx, host).await?,
            IpFamily::V4 => self.query(ctx, host, host, RecordType::A).await?,
            IpFamily::V6 => self.query(ctx, host, host, RecordType::AAAA).await?,
        };

        let ips = family.filter(addresses.iter().map(String::as_str));
        if ips.is_empty() {
            return Err(ResolveError::NotFound {
                host: host.to_string(),
            });
        }
        Ok(ips)
    }
}
