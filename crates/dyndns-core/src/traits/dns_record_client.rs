// # DNS Record Client Trait
//
// Defines the interface for reading and rewriting the managed DNS record.
//
// ## Implementations
//
// - Cloudflare: `dyndns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::{DnsRecordClient, RecordUpdate};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let client = /* DnsRecordClient implementation */;
//
//     let record = client.read_record("zone", "abc123").await?;
//     let update = RecordUpdate {
//         record_type: "A".to_string(),
//         name: record.name.clone(),
//         content: "1.2.3.4".to_string(),
//         ttl: 3600,
//         proxied: false,
//     };
//     client.update_record("zone", "abc123", &update).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A DNS record as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-assigned identifier
    pub id: String,
    /// Record type ("A", "AAAA", ...)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Fully qualified record name
    pub name: String,
    /// Record value; the published IP for address records
    pub content: String,
    /// Time-to-live in seconds (1 means "automatic" on Cloudflare)
    #[serde(default)]
    pub ttl: Option<u32>,
    /// Whether the record is proxied
    #[serde(default)]
    pub proxied: Option<bool>,
}

/// Full-replace body for a record update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordUpdate {
    /// Record type
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record name
    pub name: String,
    /// New record value
    pub content: String,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Whether the record is proxied
    pub proxied: bool,
}

/// Trait for DNS record client implementations
///
/// # Single-shot
///
/// Every method performs exactly one authenticated API call. Retrying,
/// scheduling and deciding whether an update is needed all belong to the
/// [`crate::Reconciler`].
///
/// # Errors
///
/// Each operation reports failures through its own error variant so the
/// caller can tell which stage broke:
///
/// | Operation | Error |
/// |-----------|-------|
/// | [`find_record_id`](Self::find_record_id) | [`crate::Error::Discovery`] |
/// | [`read_record`](Self::read_record) | [`crate::Error::Read`] |
/// | [`update_record`](Self::update_record) | [`crate::Error::Update`] or [`crate::Error::UpdateRejected`] |
#[async_trait]
pub trait DnsRecordClient: Send + Sync {
    /// Find the identifier of the first record matching a name and type
    ///
    /// Used at startup when no record identifier is configured. An empty
    /// match list is an error.
    async fn find_record_id(
        &self,
        zone_id: &str,
        name: &str,
        record_type: &str,
    ) -> Result<String, crate::Error>;

    /// Fetch the current state of a record by identifier
    async fn read_record(&self, zone_id: &str, record_id: &str)
    -> Result<DnsRecord, crate::Error>;

    /// Replace a record with the given field set
    ///
    /// Transport or HTTP failures return [`crate::Error::Update`]. A response
    /// that arrives but reports failure returns
    /// [`crate::Error::UpdateRejected`].
    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        update: &RecordUpdate,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserializes_provider_shape() {
        let record: DnsRecord = serde_json::from_value(serde_json::json!({
            "id": "abc123",
            "type": "A",
            "name": "home.example.com",
            "content": "1.2.3.4",
            "ttl": 3600,
            "proxied": false,
            "zone_id": "zone",
            "locked": false
        }))
        .unwrap();

        assert_eq!(record.record_type, "A");
        assert_eq!(record.content, "1.2.3.4");
        assert_eq!(record.ttl, Some(3600));
        assert_eq!(record.proxied, Some(false));
    }

    #[test]
    fn test_update_serializes_type_field() {
        let update = RecordUpdate {
            record_type: "AAAA".to_string(),
            name: "home.example.com".to_string(),
            content: "2001:db8::1".to_string(),
            ttl: 120,
            proxied: true,
        };

        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({
                "type": "AAAA",
                "name": "home.example.com",
                "content": "2001:db8::1",
                "ttl": 120,
                "proxied": true
            })
        );
    }
}
