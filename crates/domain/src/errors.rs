use thiserror::Error;

/// Failures surfaced by lookups and dials.
///
/// The type is `Clone` so a single coordinated upstream failure can be handed
/// to every caller that joined the same in-flight lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("address {address}: {reason}")]
    MalformedAddress { address: String, reason: String },

    #[error("lookup {host}: no such host")]
    NotFound { host: String },

    #[error("lookup {host}: {reason}")]
    Resolution { host: String, reason: String },

    #[error("lookup canceled")]
    Canceled,

    #[error("lookup deadline exceeded")]
    DeadlineExceeded,

    #[error("dial tcp {address}: no addresses found")]
    NoAddresses { address: String },

    #[error("dial tcp {address}: {reason}")]
    Dial { address: String, reason: String },
}

impl ResolveError {
    pub fn malformed(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }

    pub fn resolution(host: impl Into<String>, reason: impl ToString) -> Self {
        Self::Resolution {
            host: host.into(),
            reason: reason.to_string(),
        }
    }

    pub fn dial(address: impl Into<String>, reason: impl ToString) -> Self {
        Self::Dial {
            address: address.into(),
            reason: reason.to_string(),
        }
    }

    /// True when the failure only reflects the caller's own context being
    /// canceled or running out of time. Such failures are never cached.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Canceled | Self::DeadlineExceeded)
    }

    /// True for failures produced by the upstream resolver itself.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Resolution { .. })
    }
}
