//! Configuration types for the dyndns system
//!
//! [`DdnsConfig`] is what the daemon loads from its environment. The record
//! identifier may be missing there; [`crate::resolve_target`] turns it into a
//! [`ReconcileConfig`], which always carries a concrete identifier and is the
//! only configuration the [`crate::Reconciler`] accepts.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration as loaded at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Zone that holds the managed record
    pub zone_id: String,

    /// Record identifier, discovered by name when absent
    #[serde(default)]
    pub record_id: Option<String>,

    /// Settings written back on every update
    #[serde(default)]
    pub record: RecordConfig,

    /// Loop settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Create a configuration for a zone with default record and loop settings
    pub fn new(zone_id: impl Into<String>) -> Self {
        Self {
            zone_id: zone_id.into(),
            record_id: None,
            record: RecordConfig::default(),
            engine: EngineConfig::default(),
        }
    }

    /// Set the record identifier
    pub fn with_record_id(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }

    /// Set the record settings
    pub fn with_record(mut self, record: RecordConfig) -> Self {
        self.record = record;
        self
    }

    /// Set the loop settings
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Validate the configuration
    ///
    /// A record identifier or a domain name must be present, otherwise there
    /// is no way to find the record to manage.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zone_id.is_empty() {
            return Err(crate::Error::config("Zone ID cannot be empty"));
        }

        if self.record_id.as_deref().is_none_or(str::is_empty)
            && self.record.name.as_deref().is_none_or(str::is_empty)
        {
            return Err(crate::Error::config(
                "Both the DNS record ID and the domain name are missing. At least one is required.",
            ));
        }

        self.record.validate()?;
        self.engine.validate()?;

        Ok(())
    }
}

/// DNS record settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordConfig {
    /// Record name (e.g. "home.example.com"); also used for discovery
    #[serde(default)]
    pub name: Option<String>,

    /// Record type sent with every update
    #[serde(default = "default_record_type")]
    pub record_type: String,

    /// Time-to-live in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Whether traffic is routed through the provider's edge
    #[serde(default)]
    pub proxied: bool,
}

impl RecordConfig {
    /// Create record settings for a name with default type, ttl and proxy flag
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the record type
    pub fn with_record_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = record_type.into();
        self
    }

    /// Set the time-to-live
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Enable or disable proxying
    pub fn with_proxied(mut self, proxied: bool) -> Self {
        self.proxied = proxied;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), crate::Error> {
        if self.record_type.is_empty() {
            return Err(crate::Error::config("Record type cannot be empty"));
        }
        Ok(())
    }
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            name: None,
            record_type: default_record_type(),
            ttl: default_ttl(),
            proxied: false,
        }
    }
}

/// Reconcile loop configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Time between the end of one pass and the start of the next
    #[serde(default = "default_check_interval", with = "duration_secs")]
    pub check_interval: Duration,

    /// Capacity of the event channel handed out by [`crate::Reconciler::new`]
    ///
    /// When full, new events are dropped with a warning.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    pub(crate) fn validate(&self) -> Result<(), crate::Error> {
        if self.check_interval.is_zero() {
            return Err(crate::Error::config("Check interval must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            check_interval: default_check_interval(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

/// Configuration with a concrete record identifier
///
/// Only [`crate::resolve_target`] builds one from a [`DdnsConfig`], so a
/// running [`crate::Reconciler`] always knows which record it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Zone that holds the managed record
    pub zone_id: String,
    /// Identifier of the managed record
    pub record_id: String,
    /// Settings written back on every update
    pub record: RecordConfig,
    /// Loop settings
    pub engine: EngineConfig,
}

impl ReconcileConfig {
    pub(crate) fn from_parts(config: DdnsConfig, record_id: String) -> Self {
        Self {
            zone_id: config.zone_id,
            record_id,
            record: config.record,
            engine: config.engine,
        }
    }
}

fn default_record_type() -> String {
    "A".to_string()
}

fn default_ttl() -> u32 {
    3600
}

fn default_check_interval() -> Duration {
    Duration::from_secs(300)
}

fn default_event_channel_capacity() -> usize {
    64
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let record = RecordConfig::default();
        assert_eq!(record.record_type, "A");
        assert_eq!(record.ttl, 3600);
        assert!(!record.proxied);
        assert_eq!(EngineConfig::default().check_interval, Duration::from_secs(300));
    }

    #[test]
    fn test_validate_requires_id_or_name() {
        let config = DdnsConfig::new("zone");
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));

        let by_id = DdnsConfig::new("zone").with_record_id("abc123");
        assert!(by_id.validate().is_ok());

        let by_name = DdnsConfig::new("zone").with_record(RecordConfig::new("x.example.com"));
        assert!(by_name.validate().is_ok());
    }

    #[test]
    fn test_validate_treats_empty_id_as_absent() {
        let mut config = DdnsConfig::new("zone");
        config.record_id = Some(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = DdnsConfig::new("zone")
            .with_record_id("abc123")
            .with_engine(EngineConfig {
                check_interval: Duration::ZERO,
                ..EngineConfig::default()
            });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: DdnsConfig = serde_json::from_value(serde_json::json!({
            "zone_id": "zone",
            "record_id": "abc123",
            "engine": { "check_interval": 60 }
        }))
        .unwrap();

        assert_eq!(config.record.record_type, "A");
        assert_eq!(config.engine.check_interval, Duration::from_secs(60));
        assert_eq!(config.engine.event_channel_capacity, 64);
    }
}
