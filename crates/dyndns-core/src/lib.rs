// # dyndns-core
//
// Core library for the dyndns reconcile loop.
//
// ## Architecture Overview
//
// This library keeps a single DNS record pointed at the current public IP:
// - **IpResolver**: Trait for asking an external service for the public IP
// - **DnsRecordClient**: Trait for reading, updating and discovering a DNS record
// - **Reconciler**: Fetch-compare-update loop that ties the two together
// - **resolve_target**: Startup step that pins down the record identifier
//
// ## Design Principles
//
// 1. **Stateless passes**: Every pass re-reads both sides, nothing is cached
// 2. **Single-shot collaborators**: Resolvers and clients never retry
// 3. **Non-fatal cycles**: Only startup errors end the process
// 4. **Library-First**: The daemon is a thin wrapper around this crate

pub mod config;
pub mod engine;
pub mod error;
pub mod traits;

// Re-export core types for convenience
pub use config::{DdnsConfig, EngineConfig, ReconcileConfig, RecordConfig};
pub use engine::{PassOutcome, ReconcileEvent, Reconciler, resolve_target};
pub use error::{Error, Result};
pub use traits::{DnsRecord, DnsRecordClient, IpResolver, RecordUpdate};
