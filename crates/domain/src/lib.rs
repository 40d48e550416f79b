//! dnscache domain layer: configuration, error taxonomy and plain value types.
pub mod config;
pub mod errors;
pub mod ip_family;
pub mod stats;

pub use config::{
    parse_endpoint, CliOverrides, Config, ConfigError, DialStrategy, LoggingConfig, ResolverConfig,
};
pub use errors::ResolveError;
pub use ip_family::IpFamily;
pub use stats::ResolverStats;
