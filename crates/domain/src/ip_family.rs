use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Address family selector for typed lookups ("ip", "ip4", "ip6").
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash, Default)]
pub enum IpFamily {
    #[default]
    #[serde(rename = "ip")]
    Any,
    #[serde(rename = "ip4")]
    V4,
    #[serde(rename = "ip6")]
    V6,
}

impl IpFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "ip",
            Self::V4 => "ip4",
            Self::V6 => "ip6",
        }
    }

    /// Whether `ip` belongs to this family.
    ///
    /// IPv4-mapped IPv6 addresses have a 4-byte form and therefore count as
    /// IPv4, never as IPv6.
    pub fn matches(&self, ip: &IpAddr) -> bool {
        let has_v4_form = match ip {
            IpAddr::V4(_) => true,
            IpAddr::V6(v6) => v6.to_ipv4_mapped().is_some(),
        };
        match self {
            Self::Any => true,
            Self::V4 => has_v4_form,
            Self::V6 => !has_v4_form,
        }
    }

    /// Parses each address string and keeps those of this family, preserving
    /// order. Unparsable strings are skipped.
    pub fn filter<'a, I>(&self, addresses: I) -> Vec<IpAddr>
    where
        I: IntoIterator<Item = &'a str>,
    {
        addresses
            .into_iter()
            .filter_map(|s| s.parse::<IpAddr>().ok())
            .filter(|ip| self.matches(ip))
            .collect()
    }

    pub fn filter_ips(&self, ips: Vec<IpAddr>) -> Vec<IpAddr> {
        ips.into_iter().filter(|ip| self.matches(ip)).collect()
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IpFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ip" | "any" => Ok(Self::Any),
            "ip4" | "ipv4" | "v4" => Ok(Self::V4),
            "ip6" | "ipv6" | "v6" => Ok(Self::V6),
            other => Err(format!("unknown address family '{}'", other)),
        }
    }
}
