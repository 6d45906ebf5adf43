// # IP Resolver Trait
//
// Defines the interface for learning the current public IP address.
//
// ## Implementations
//
// - HTTP echo services: `dyndns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use dyndns_core::IpResolver;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* IpResolver implementation */;
//
//     let current_ip = resolver.resolve().await?;
//     println!("public IP: {current_ip}");
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for IP resolver implementations
///
/// # Single-shot
///
/// One call is one outbound request. Implementations must not retry or
/// cache: the [`crate::Reconciler`] calls `resolve()` once per pass and
/// the next pass is the retry.
///
/// # Errors
///
/// Any failure (transport, non-success status, body that is not an IP
/// address) is reported as [`crate::Error::Resolve`].
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Get the current public IP address as text
    ///
    /// The returned string is trimmed and is a valid IPv4 or IPv6 address.
    async fn resolve(&self) -> Result<String, crate::Error>;

    /// Get the resolver name (for logging/debugging)
    fn resolver_name(&self) -> &'static str;
}
