use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::resolver::{DialStrategy, ResolverConfig};

/// Main configuration structure for dnscache
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Cache, refresh and dialing behaviour
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Values given on the command line, applied on top of the file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub resolver_endpoint: Option<String>,
    pub dial_strategy: Option<DialStrategy>,
    pub disabled: Option<bool>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. dnscache.toml in current directory
    /// 3. /etc/dnscache/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("dnscache.toml").exists() {
            Self::from_file("dnscache.toml")?
        } else if std::path::Path::new("/etc/dnscache/config.toml").exists() {
            Self::from_file("/etc/dnscache/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(endpoint) = overrides.resolver_endpoint {
            self.resolver.resolver_endpoint = Some(endpoint);
        }
        if let Some(strategy) = overrides.dial_strategy {
            self.resolver.dial_strategy = strategy;
        }
        if let Some(disabled) = overrides.disabled {
            self.resolver.disabled = disabled;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolver.validate()
    }
}
