// # HTTP IP Resolver
//
// This crate provides the `IpResolver` implementation backed by a plain-text
// IP echo service (api.ipify.org by default).
//
// ## Contract
//
// - One GET per `resolve()` call, no retry
// - HTTP timeout configured (10 seconds)
// - Non-2xx status, unreadable body or a body that is not an IP address
//   are all reported as `Error::Resolve`
// - Surrounding whitespace is stripped before validation

use async_trait::async_trait;
use dyndns_core::traits::IpResolver;
use dyndns_core::{Error, Result};

use std::net::IpAddr;
use std::time::Duration;

/// Echo service used when none is configured
pub const DEFAULT_IP_ECHO_URL: &str = "https://api.ipify.org";

/// Default HTTP timeout for echo requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves the public IP by asking an HTTP echo service
#[derive(Debug, Clone)]
pub struct HttpIpResolver {
    /// URL returning the caller's address as plain text
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpResolver {
    /// Create a resolver for the given echo URL
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Echo URL this resolver queries
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl IpResolver for HttpIpResolver {
    async fn resolve(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::resolve(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::resolve(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let ip_text = response
            .text()
            .await
            .map_err(|e| Error::resolve(format!("Failed to read response: {}", e)))?;

        let ip_text = ip_text.trim();

        ip_text
            .parse::<IpAddr>()
            .map_err(|_| Error::resolve(format!("Invalid IP address: {}", ip_text)))?;

        tracing::debug!("Echo service {} answered {}", self.url, ip_text);
        Ok(ip_text.to_string())
    }

    fn resolver_name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_resolve_plain_ipv4() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(200).body("1.2.3.4");
            })
            .await;

        let resolver = HttpIpResolver::new(server.url("/")).unwrap();
        let ip = assert_ok!(resolver.resolve().await);

        assert_eq!(ip, "1.2.3.4");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolve_trims_whitespace() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/ip");
                then.status(200).body("  2001:db8::7\n");
            })
            .await;

        let resolver = HttpIpResolver::new(server.url("/ip")).unwrap();

        assert_eq!(assert_ok!(resolver.resolve().await), "2001:db8::7");
    }

    #[tokio::test]
    async fn test_non_success_status_fails() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(503).body("1.2.3.4");
            })
            .await;

        let resolver = HttpIpResolver::new(server.url("/")).unwrap();
        let err = assert_err!(resolver.resolve().await);

        assert!(matches!(err, Error::Resolve(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_garbage_body_fails() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(200).body("<html>rate limited</html>");
            })
            .await;

        let resolver = HttpIpResolver::new(server.url("/")).unwrap();
        let err = assert_err!(resolver.resolve().await);

        assert_eq!(
            err,
            Error::resolve("Invalid IP address: <html>rate limited</html>")
        );
    }

    #[tokio::test]
    async fn test_unreachable_service_fails() {
        let resolver = HttpIpResolver::new("http://127.0.0.1:9").unwrap();

        let err = assert_err!(resolver.resolve().await);

        assert!(matches!(err, Error::Resolve(_)), "got {err:?}");
    }

    #[test]
    fn test_resolver_name() {
        let resolver = HttpIpResolver::new(DEFAULT_IP_ECHO_URL).unwrap();
        assert_eq!(resolver.resolver_name(), "http");
        assert_eq!(resolver.url(), "https://api.ipify.org");
    }
}
