//! Error types for the dyndns system
//!
//! Each variant maps to one stage of the reconcile flow, so callers can log
//! a failure with the right amount of detail without inspecting strings.

use thiserror::Error;

/// Result type alias for dyndns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the dyndns system
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Missing or malformed settings (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The IP echo service was unreachable or returned garbage
    #[error("IP resolver error: {0}")]
    Resolve(String),

    /// Reading the managed record failed
    #[error("DNS record read failed: {0}")]
    Read(String),

    /// Writing the managed record failed at the HTTP/transport level
    #[error("DNS record update failed: {0}")]
    Update(String),

    /// The provider answered the write but reported `success=false`
    #[error("DNS record update rejected by {provider}: {message}")]
    UpdateRejected {
        /// Provider name
        provider: String,
        /// Messages reported by the provider
        message: String,
    },

    /// Looking up the record identifier by name failed (fatal at startup)
    #[error("DNS record discovery failed: {0}")]
    Discovery(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an IP resolver error
    pub fn resolve(msg: impl Into<String>) -> Self {
        Self::Resolve(msg.into())
    }

    /// Create a record read error
    pub fn read(msg: impl Into<String>) -> Self {
        Self::Read(msg.into())
    }

    /// Create a record update error
    pub fn update(msg: impl Into<String>) -> Self {
        Self::Update(msg.into())
    }

    /// Create a provider-side rejection of an update
    pub fn update_rejected(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpdateRejected {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a record discovery error
    pub fn discovery(msg: impl Into<String>) -> Self {
        Self::Discovery(msg.into())
    }

    /// Whether this error must stop the process instead of a single pass
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Discovery(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(Error::config("missing ZONE_ID").is_fatal());
        assert!(Error::discovery("no records").is_fatal());
        assert!(!Error::resolve("timeout").is_fatal());
        assert!(!Error::read("404").is_fatal());
        assert!(!Error::update("500").is_fatal());
        assert!(!Error::update_rejected("cloudflare", "bad content").is_fatal());
    }

    #[test]
    fn test_rejection_display_names_provider() {
        let err = Error::update_rejected("cloudflare", "[9005] Content for A record is invalid");
        assert_eq!(
            err.to_string(),
            "DNS record update rejected by cloudflare: [9005] Content for A record is invalid"
        );
    }
}
