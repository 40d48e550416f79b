use async_trait::async_trait;
use dnscache_application::ports::Dialer;
use dnscache_application::LookupContext;
use dnscache_domain::ResolveError;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

/// Plain TCP connect, optionally bounded per attempt.
#[derive(Debug, Clone, Default)]
pub struct TcpDialer {
    timeout: Option<Duration>,
}

impl TcpDialer {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Dialer for TcpDialer {
    async fn dial(&self, ctx: &LookupContext, address: &str) -> Result<TcpStream, ResolveError> {
        let connect = async {
            TcpStream::connect(address)
                .await
                .map_err(|e| ResolveError::dial(address, e))
        };

        let stream = match self.timeout {
            Some(timeout) => {
                ctx.run(async {
                    tokio::time::timeout(timeout, connect)
                        .await
                        .map_err(|_| ResolveError::dial(address, "i/o timeout"))?
                })
                .await?
            }
            None => ctx.run(connect).await?,
        };

        debug!(address, "Connected");
        Ok(stream)
    }
}
