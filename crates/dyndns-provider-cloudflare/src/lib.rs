// # Cloudflare DNS Record Client
//
// This crate provides the Cloudflare implementation of `DnsRecordClient`.
//
// ## Behavior
//
// - One HTTP request per call, no retry, no backoff (owned by the Reconciler)
// - HTTP timeout configured (30 seconds)
// - Status-specific error messages (401/403, 404, 409, 429, 5xx)
// - HTTP failures and `success=false` answers are reported as different errors
// - API token is attached as a bearer credential and never logged
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...&type=...`
// - DNS Record Details: GET `/zones/:zone_id/dns_records/:record_id`
// - Overwrite DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use dyndns_core::traits::{DnsRecord, DnsRecordClient, RecordUpdate};
use dyndns_core::{Error, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER_NAME: &str = "cloudflare";

/// Envelope shared by every Cloudflare v4 response
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: Option<i64>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RecordRef {
    id: String,
}

/// Cloudflare DNS record client
///
/// Stateless between calls: every method builds its URL from the zone and
/// record passed in.
pub struct CloudflareClient {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API root, without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareClient")
            .field("api_token", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl CloudflareClient {
    /// Create a new Cloudflare client
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:DNS:Edit permissions
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the token is empty or the HTTP client cannot be built.
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            api_base: CLOUDFLARE_API_BASE.to_string(),
            client,
        })
    }

    /// Point the client at a different API root (mock servers, API gateways)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn records_url(&self, zone_id: &str) -> String {
        format!("{}/zones/{}/dns_records", self.api_base, zone_id)
    }

    fn record_url(&self, zone_id: &str, record_id: &str) -> String {
        format!("{}/dns_records/{}", self.zone_url(zone_id), record_id)
    }

    fn zone_url(&self, zone_id: &str) -> String {
        format!("{}/zones/{}", self.api_base, zone_id)
    }

    /// Send an authenticated request and decode the envelope
    ///
    /// Writes get their `Content-Type` from `RequestBuilder::json` only.
    ///
    /// Returns a description of the failure for the caller to wrap in the
    /// error variant of its operation.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        action: &str,
    ) -> std::result::Result<ApiResponse<T>, String> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(describe_status(status, &error_text, action));
        }

        response
            .json::<ApiResponse<T>>()
            .await
            .map_err(|e| format!("Failed to parse response: {}", e))
    }
}

/// Map an HTTP failure to a readable message
fn describe_status(status: StatusCode, error_text: &str, action: &str) -> String {
    match status.as_u16() {
        401 | 403 => format!(
            "Authentication failed: Invalid API token or insufficient permissions. Status: {}",
            status
        ),
        404 => format!("Not found while trying to {}. Status: {}", action, status),
        409 => format!(
            "Conflict: Record is being updated by another process. Status: {}",
            status
        ),
        429 => format!("Rate limit exceeded. Please retry later. Status: {}", status),
        500..=599 => format!(
            "Cloudflare server error (transient): {} - {}",
            status, error_text
        ),
        _ => format!("Failed to {}: {} - {}", action, status, error_text),
    }
}

/// Join the provider's error list into one line
fn format_errors(errors: &[ApiMessage]) -> String {
    if errors.is_empty() {
        return "no error details".to_string();
    }

    errors
        .iter()
        .map(|e| match e.code {
            Some(code) => format!("[{}] {}", code, e.message),
            None => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[async_trait]
impl DnsRecordClient for CloudflareClient {
    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?name=example.com&type=A
    /// Authorization: Bearer <token>
    /// ```
    async fn find_record_id(&self, zone_id: &str, name: &str, record_type: &str) -> Result<String> {
        tracing::debug!("Looking up record ID: {} (type: {})", name, record_type);

        let request = self
            .client
            .get(self.records_url(zone_id))
            .query(&[("name", name), ("type", record_type)]);

        let body: ApiResponse<Vec<RecordRef>> = self
            .execute(request, "list DNS records")
            .await
            .map_err(Error::discovery)?;

        if !body.success {
            return Err(Error::discovery(format!(
                "API returned success=false: {}",
                format_errors(&body.errors)
            )));
        }

        let record = body
            .result
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| {
                Error::discovery(format!(
                    "No DNS records found for {} of type {}",
                    name, record_type
                ))
            })?;

        tracing::debug!("Found record ID: {}", record.id);
        Ok(record.id)
    }

    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records/:record_id
    /// Authorization: Bearer <token>
    /// ```
    async fn read_record(&self, zone_id: &str, record_id: &str) -> Result<DnsRecord> {
        let request = self.client.get(self.record_url(zone_id, record_id));

        let body: ApiResponse<DnsRecord> = self
            .execute(request, "get DNS record")
            .await
            .map_err(Error::read)?;

        if !body.success {
            return Err(Error::read(format!(
                "API returned success=false: {}",
                format_errors(&body.errors)
            )));
        }

        body.result
            .ok_or_else(|| Error::read("Invalid response format: result is missing"))
    }

    /// # API Call
    ///
    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// Authorization: Bearer <token>
    ///
    /// { "type": "A", "name": "...", "content": "1.2.3.4", "ttl": 3600, "proxied": false }
    /// ```
    async fn update_record(&self, zone_id: &str, record_id: &str, update: &RecordUpdate) -> Result<()> {
        tracing::debug!(
            "Sending PUT for record {}: {} -> {} ({})",
            record_id,
            update.name,
            update.content,
            update.record_type
        );

        let request = self
            .client
            .put(self.record_url(zone_id, record_id))
            .json(update);

        let body: ApiResponse<serde_json::Value> = self
            .execute(request, "update DNS record")
            .await
            .map_err(Error::update)?;

        if !body.success {
            return Err(Error::update_rejected(PROVIDER_NAME, format_errors(&body.errors)));
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
