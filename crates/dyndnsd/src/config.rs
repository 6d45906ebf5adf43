//! Daemon configuration from environment variables
//!
//! Every setting comes from the environment (optionally seeded from a `.env`
//! file). Empty variables are treated as unset.

use anyhow::{Context, Result};
use dyndns_core::{DdnsConfig, EngineConfig, RecordConfig};
use dyndns_ip_http::DEFAULT_IP_ECHO_URL;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const REQUIRED_VARS: &[&str] = &["CLOUDFLARE_API_TOKEN", "ZONE_ID"];

const DEFAULT_RECORD_TYPE: &str = "A";
const DEFAULT_TTL: u32 = 3600;
const DEFAULT_CHECK_INTERVAL_SECS: u64 = 300;
const DEFAULT_LOG_FILE: &str = "cf_dyndns.log";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Application configuration
pub struct Config {
    pub api_token: String,
    pub zone_id: String,
    pub record_id: Option<String>,
    pub domain_name: Option<String>,
    pub record_type: String,
    pub ttl: u32,
    pub proxied: bool,
    pub check_interval_secs: u64,
    pub ip_echo_url: String,
    pub log_file: PathBuf,
    pub log_level: String,
}

// Keep the API token out of any formatted output
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("record_id", &self.record_id)
            .field("domain_name", &self.domain_name)
            .field("record_type", &self.record_type)
            .field("ttl", &self.ttl)
            .field("proxied", &self.proxied)
            .field("check_interval_secs", &self.check_interval_secs)
            .field("ip_echo_url", &self.ip_echo_url)
            .field("log_file", &self.log_file)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let (Some(api_token), Some(zone_id)) = (var("CLOUDFLARE_API_TOKEN"), var("ZONE_ID")) else {
            let missing: Vec<&str> = REQUIRED_VARS
                .iter()
                .copied()
                .filter(|key| var(*key).is_none())
                .collect();
            anyhow::bail!(
                "Missing required environment variables: {}",
                missing.join(", ")
            );
        };

        let ttl = match var("TTL") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("TTL must be an integer. Got: {}", raw))?,
            None => DEFAULT_TTL,
        };

        let check_interval_secs = match var("CHECK_INTERVAL") {
            Some(raw) => raw.trim().parse::<u64>().with_context(|| {
                format!("CHECK_INTERVAL must be an integer number of seconds. Got: {}", raw)
            })?,
            None => DEFAULT_CHECK_INTERVAL_SECS,
        };

        Ok(Self {
            api_token,
            zone_id,
            record_id: var("DNS_RECORD_ID"),
            domain_name: var("DOMAIN_NAME"),
            record_type: var("RECORD_TYPE").unwrap_or_else(|| DEFAULT_RECORD_TYPE.to_string()),
            ttl,
            proxied: var("PROXIED").is_some_and(|value| value.eq_ignore_ascii_case("true")),
            check_interval_secs,
            ip_echo_url: var("IP_ECHO_URL").unwrap_or_else(|| DEFAULT_IP_ECHO_URL.to_string()),
            log_file: var("LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            log_level: var("DDNS_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Checks value formats that the engine itself does not care about:
    /// token shape, domain syntax, URL scheme and log level.
    pub fn validate(&self) -> Result<()> {
        // Check for obvious placeholder tokens (common mistake)
        let token_lower = self.api_token.to_lowercase();
        if token_lower.contains("your_token")
            || token_lower.contains("replace_me")
            || token_lower == "token"
        {
            anyhow::bail!(
                "CLOUDFLARE_API_TOKEN appears to be a placeholder. \
                Use an actual API token from the Cloudflare dashboard."
            );
        }

        if self.record_id.is_none() && self.domain_name.is_none() {
            anyhow::bail!(
                "Either DNS_RECORD_ID or DOMAIN_NAME must be set. \
                Set it via: export DOMAIN_NAME=home.example.com"
            );
        }

        if let Some(ref domain) = self.domain_name {
            validate_domain_name(domain)?;
        }

        if !self.record_type.chars().all(|c| c.is_ascii_alphanumeric()) {
            anyhow::bail!(
                "RECORD_TYPE '{}' is not valid. Expected a record type such as A or AAAA",
                self.record_type
            );
        }

        if self.check_interval_secs == 0 {
            anyhow::bail!("CHECK_INTERVAL must be greater than 0 seconds");
        }

        // Validate echo URL scheme
        if !self.ip_echo_url.starts_with("https://") && !self.ip_echo_url.starts_with("http://") {
            anyhow::bail!(
                "IP_ECHO_URL must use HTTP or HTTPS scheme. Got: {}",
                self.ip_echo_url
            );
        }

        // Logging is not up yet, so warnings go to stderr
        if self.ip_echo_url.starts_with("http://") {
            eprintln!(
                "WARNING: IP_ECHO_URL uses HTTP (not HTTPS). \
                The reported address could be tampered with in transit."
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Engine-facing configuration
    pub fn ddns_config(&self) -> DdnsConfig {
        let record = RecordConfig {
            name: self.domain_name.clone(),
            record_type: self.record_type.to_uppercase(),
            ttl: self.ttl,
            proxied: self.proxied,
        };

        let engine = EngineConfig {
            check_interval: Duration::from_secs(self.check_interval_secs),
            ..EngineConfig::default()
        };

        let mut config = DdnsConfig::new(self.zone_id.clone())
            .with_record(record)
            .with_engine(engine);
        config.record_id = self.record_id.clone();
        config
    }
}

/// Validate that a string is a valid domain name
///
/// Basic RFC 1035 checks. A leading `*` label is accepted for wildcard records.
fn validate_domain_name(domain: &str) -> Result<()> {
    // Total length limit (RFC 1035: 253 chars max)
    if domain.len() > 253 {
        anyhow::bail!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        );
    }

    for (index, label) in domain.split('.').enumerate() {
        if label.is_empty() {
            anyhow::bail!("Domain name has empty label: '{}'", domain);
        }

        if index == 0 && label == "*" {
            continue;
        }

        if label.len() > 63 {
            anyhow::bail!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            );
        }

        if !label.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
            anyhow::bail!(
                "Domain label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric, hyphen and underscore only.",
                label
            );
        }

        if label.starts_with('-') || label.ends_with('-') {
            anyhow::bail!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            );
        }
    }

    Ok(())
}
