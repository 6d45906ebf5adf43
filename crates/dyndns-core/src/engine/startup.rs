//! Startup record resolution
//!
//! Runs once before the loop. This is the only place where a failed network
//! call is fatal: without a concrete record there is nothing to reconcile.

use crate::config::{DdnsConfig, ReconcileConfig};
use crate::error::{Error, Result};
use crate::traits::DnsRecordClient;
use tracing::{error, info};

/// Pin down the record to manage
///
/// A configured record id is used as is, without any network call.
/// Otherwise the record is looked up by domain name and type.
///
/// # Errors
///
/// - [`Error::Config`] when the configuration is invalid, including when
///   neither a record id nor a domain name is set
/// - [`Error::Discovery`] when the lookup fails or finds nothing
pub async fn resolve_target(
    client: &dyn DnsRecordClient,
    config: DdnsConfig,
) -> Result<ReconcileConfig> {
    config.validate()?;

    if let Some(record_id) = config.record_id.clone().filter(|id| !id.is_empty()) {
        info!("Using configured DNS record ID: {}", record_id);
        return Ok(ReconcileConfig::from_parts(config, record_id));
    }

    let name = config
        .record
        .name
        .clone()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::config("Domain name is required when no DNS record ID is set"))?;

    info!(
        "DNS record ID not provided. Attempting to find it automatically for {}...",
        name
    );

    let record_id = client
        .find_record_id(&config.zone_id, &name, &config.record.record_type)
        .await
        .map_err(|e| match e {
            Error::Discovery(_) => e,
            other => Error::discovery(other.to_string()),
        })?;

    if record_id.is_empty() {
        error!("Provider returned an empty record ID for {}", name);
        return Err(Error::discovery(format!(
            "Empty record ID returned for {} (type: {})",
            name, config.record.record_type
        )));
    }

    info!("Found DNS record ID for {}: {}", name, record_id);
    Ok(ReconcileConfig::from_parts(config, record_id))
}
