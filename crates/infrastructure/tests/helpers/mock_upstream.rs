#![allow(dead_code)]
use async_trait::async_trait;
use dnscache_application::ports::{Dialer, UpstreamResolver};
use dnscache_application::LookupContext;
use dnscache_domain::{IpFamily, ResolveError, ResolverConfig};
use dnscache_infrastructure::dns::{CachingResolver, ResolverBuilder};
use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpStream;

#[derive(Debug, Clone)]
pub enum MockResponse {
    Values(Vec<String>),
    Failure(ResolveError),
}

/// Scripted upstream: fixed answers, optional latency, call counting.
pub struct MockUpstream {
    forward: Mutex<MockResponse>,
    reverse: Mutex<MockResponse>,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockUpstream {
    pub fn with_values(values: &[&str]) -> Self {
        Self {
            forward: Mutex::new(MockResponse::Values(strings(values))),
            reverse: Mutex::new(MockResponse::Failure(ResolveError::NotFound {
                host: String::new(),
            })),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        let upstream = Self::with_values(&[]);
        upstream.set_failure(server_failure());
        upstream
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_values(&self, values: &[&str]) {
        *self.forward.lock().unwrap() = MockResponse::Values(strings(values));
    }

    pub fn set_failure(&self, err: ResolveError) {
        *self.forward.lock().unwrap() = MockResponse::Failure(err);
    }

    pub fn set_reverse(&self, names: &[&str]) {
        *self.reverse.lock().unwrap() = MockResponse::Values(strings(names));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn respond(
        &self,
        ctx: &LookupContext,
        response: &Mutex<MockResponse>,
    ) -> Result<Vec<String>, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delay;
        ctx.run(async move {
            tokio::time::sleep(delay).await;
            Ok(())
        })
        .await?;

        let response = response.lock().unwrap().clone();
        match response {
            MockResponse::Values(values) => Ok(values),
            MockResponse::Failure(err) => Err(err),
        }
    }
}

#[async_trait]
impl UpstreamResolver for MockUpstream {
    async fn lookup_host(
        &self,
        ctx: &LookupContext,
        _host: &str,
    ) -> Result<Vec<String>, ResolveError> {
        self.respond(ctx, &self.forward).await
    }

    async fn lookup_addr(
        &self,
        ctx: &LookupContext,
        _addr: &str,
    ) -> Result<Vec<String>, ResolveError> {
        self.respond(ctx, &self.reverse).await
    }

    async fn lookup_ip(
        &self,
        ctx: &LookupContext,
        family: IpFamily,
        host: &str,
    ) -> Result<Vec<IpAddr>, ResolveError> {
        let values = self.lookup_host(ctx, host).await?;
        Ok(family.filter(values.iter().map(String::as_str)))
    }
}

/// Dialer that records every attempt and only connects for accepted targets,
/// always to the same local listener.
pub struct RecordingDialer {
    listener: SocketAddr,
    accepted: HashSet<String>,
    attempts: Mutex<Vec<String>>,
}

impl RecordingDialer {
    pub fn new(listener: SocketAddr, accepted: &[&str]) -> Self {
        Self {
            listener,
            accepted: accepted.iter().map(|s| s.to_string()).collect(),
            attempts: Mutex::new(Vec::new()),
        }
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dialer for RecordingDialer {
    async fn dial(&self, _ctx: &LookupContext, address: &str) -> Result<TcpStream, ResolveError> {
        self.attempts.lock().unwrap().push(address.to_string());
        if !self.accepted.contains(address) {
            return Err(ResolveError::dial(address, "connection refused"));
        }
        TcpStream::connect(self.listener)
            .await
            .map_err(|e| ResolveError::dial(address, e))
    }
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

pub fn server_failure() -> ResolveError {
    ResolveError::Resolution {
        host: "mock".to_string(),
        reason: "server misbehaving".to_string(),
    }
}

pub fn fast_config() -> ResolverConfig {
    ResolverConfig {
        cache_ttl_ms: 60_000,
        cache_fail_ttl_ms: 100,
        ..ResolverConfig::default()
    }
}

pub fn build_resolver(config: ResolverConfig, upstream: &Arc<MockUpstream>) -> CachingResolver {
    ResolverBuilder::new(config)
        .with_upstream(Arc::clone(upstream) as Arc<dyn UpstreamResolver>)
        .build()
        .unwrap()
}
