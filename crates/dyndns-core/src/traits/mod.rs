//! Core traits for the dyndns system
//!
//! This module defines the abstract interfaces the reconcile loop drives.
//!
//! - [`IpResolver`]: Ask an external service for the current public IP
//! - [`DnsRecordClient`]: Read, update and discover the managed DNS record

pub mod dns_record_client;
pub mod ip_resolver;

pub use dns_record_client::{DnsRecord, DnsRecordClient, RecordUpdate};
pub use ip_resolver::IpResolver;
