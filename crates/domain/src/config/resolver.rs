use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use super::errors::ConfigError;

pub const DEFAULT_DNS_PORT: u16 = 53;

/// How resolved addresses are ordered before sequential dial attempts.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DialStrategy {
    Sequential,

    RoundRobin,

    #[default]
    Random,
}

impl DialStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sequential => "sequential",
            Self::RoundRobin => "round_robin",
            Self::Random => "random",
        }
    }
}

impl std::str::FromStr for DialStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "sequential" => Ok(Self::Sequential),
            "round_robin" | "roundrobin" => Ok(Self::RoundRobin),
            "random" => Ok(Self::Random),
            other => Err(ConfigError::Validation(format!(
                "unknown dial strategy '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ResolverConfig {
    /// Bypass the cache entirely and talk to the upstream directly.
    #[serde(default = "default_false")]
    pub disabled: bool,

    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,

    #[serde(default = "default_cache_fail_ttl_ms")]
    pub cache_fail_ttl_ms: u64,

    /// Re-fetch hot entries in the background once half their TTL is gone.
    #[serde(default = "default_false")]
    pub auto_refresh: bool,

    /// Serve the last known values when the upstream fails.
    #[serde(default = "default_false")]
    pub persist_on_failure: bool,

    /// Mark-sweep interval; 0 disables the background sweep.
    #[serde(default)]
    pub cleanup_interval_ms: u64,

    #[serde(default)]
    pub dial_strategy: DialStrategy,

    /// Timeout of a single connection attempt; 0 means none.
    #[serde(default)]
    pub dial_timeout_ms: u64,

    /// Fixed upstream resolver, `ip` or `ip:port`.
    #[serde(default)]
    pub resolver_endpoint: Option<String>,

    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            disabled: false,
            cache_ttl_ms: default_cache_ttl_ms(),
            cache_fail_ttl_ms: default_cache_fail_ttl_ms(),
            auto_refresh: false,
            persist_on_failure: false,
            cleanup_interval_ms: 0,
            dial_strategy: DialStrategy::default(),
            dial_timeout_ms: 0,
            resolver_endpoint: None,
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

impl ResolverConfig {
    /// Positive cache lifetime. Zero is treated as unset.
    pub fn cache_ttl(&self) -> Duration {
        match self.cache_ttl_ms {
            0 => Duration::from_millis(default_cache_ttl_ms()),
            ms => Duration::from_millis(ms),
        }
    }

    /// Negative cache lifetime. Zero is treated as unset.
    pub fn cache_fail_ttl(&self) -> Duration {
        match self.cache_fail_ttl_ms {
            0 => Duration::from_millis(default_cache_fail_ttl_ms()),
            ms => Duration::from_millis(ms),
        }
    }

    pub fn cleanup_interval(&self) -> Option<Duration> {
        (self.cleanup_interval_ms > 0).then(|| Duration::from_millis(self.cleanup_interval_ms))
    }

    pub fn dial_timeout(&self) -> Option<Duration> {
        (self.dial_timeout_ms > 0).then(|| Duration::from_millis(self.dial_timeout_ms))
    }

    pub fn query_timeout(&self) -> Duration {
        match self.query_timeout_ms {
            0 => Duration::from_millis(default_query_timeout_ms()),
            ms => Duration::from_millis(ms),
        }
    }

    /// Parses `resolver_endpoint`, defaulting the port to 53.
    pub fn endpoint(&self) -> Result<Option<SocketAddr>, ConfigError> {
        self.resolver_endpoint
            .as_deref()
            .map(parse_endpoint)
            .transpose()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.endpoint()?;
        Ok(())
    }
}

/// Accepts `1.1.1.1`, `1.1.1.1:5353`, `2606:4700::1111` and `[::1]:53`.
pub fn parse_endpoint(raw: &str) -> Result<SocketAddr, ConfigError> {
    let raw = raw.trim();
    if let Ok(addr) = raw.parse::<SocketAddr>() {
        return Ok(addr);
    }
    raw.parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, DEFAULT_DNS_PORT))
        .map_err(|_| {
            ConfigError::Validation(format!("invalid resolver endpoint '{}'", raw))
        })
}

fn default_false() -> bool {
    false
}

fn default_cache_ttl_ms() -> u64 {
    60_000
}

fn default_cache_fail_ttl_ms() -> u64 {
    1_000
}

fn default_query_timeout_ms() -> u64 {
    2_000
}
