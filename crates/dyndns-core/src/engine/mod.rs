//! Core reconcile loop
//!
//! The [`Reconciler`] is responsible for:
//! - Asking the [`IpResolver`] for the current public IP
//! - Reading the published IP from the [`DnsRecordClient`]
//! - Rewriting the record when the two differ
//! - Waiting a fixed interval and starting over
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────┐  tick   ┌──────────────┐
//!   │   Idle   │────────▶│ Reconciling  │
//!   │ (sleep)  │◀────────│  (one pass)  │
//!   └──────────┘  done   └──────────────┘
//!                          │         │
//!                resolve() │         │ read_record() / update_record()
//!                          ▼         ▼
//!                ┌────────────┐  ┌─────────────────┐
//!                │ IpResolver │  │ DnsRecordClient │
//!                └────────────┘  └─────────────────┘
//! ```
//!
//! ## Pass Flow
//!
//! 1. Resolve the current IP (failure ends the pass)
//! 2. Read the managed record (failure ends the pass)
//! 3. Equal: nothing to do
//! 4. Different: full-replace update with the configured fields
//!
//! A failed pass is logged and the loop carries on at the next tick.

mod startup;

pub use startup::resolve_target;

use crate::config::ReconcileConfig;
use crate::error::{Error, Result};
use crate::traits::{DnsRecordClient, IpResolver, RecordUpdate};
use std::future::Future;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Result of a successful pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// Published IP already matched, nothing was written
    Unchanged {
        /// The current IP address
        ip: String,
    },
    /// The record was rewritten
    Updated {
        /// IP published before the update
        previous_ip: String,
        /// IP published now
        new_ip: String,
    },
}

/// Events emitted by the Reconciler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    /// Loop started
    Started {
        record_id: String,
    },

    /// A pass finished without error
    PassSucceeded {
        outcome: PassOutcome,
    },

    /// A pass ended early
    PassFailed {
        error: Error,
    },

    /// Loop stopped
    Stopped {
        reason: String,
    },
}

/// Core reconcile loop
///
/// ## Lifecycle
///
/// 1. Pin the record with [`resolve_target()`]
/// 2. Create with [`Reconciler::new()`]
/// 3. Drive with [`Reconciler::run_until()`]
/// 4. The loop returns once the shutdown future resolves between passes
///
/// ## Threading
///
/// Passes run one after another on the calling task and never overlap.
pub struct Reconciler {
    /// Source of the current public IP
    resolver: Box<dyn IpResolver>,

    /// Access to the managed record
    client: Box<dyn DnsRecordClient>,

    /// Immutable configuration with a concrete record id
    config: ReconcileConfig,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<ReconcileEvent>,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Returns
    ///
    /// A tuple of (reconciler, event_receiver) where event_receiver yields
    /// loop events. Dropping the receiver is fine; events are then discarded.
    pub fn new(
        resolver: Box<dyn IpResolver>,
        client: Box<dyn DnsRecordClient>,
        config: ReconcileConfig,
    ) -> Result<(Self, mpsc::Receiver<ReconcileEvent>)> {
        if config.record_id.is_empty() {
            return Err(Error::config("DNS record ID cannot be empty"));
        }
        config.record.validate()?;
        config.engine.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let reconciler = Self {
            resolver,
            client,
            config,
            event_tx: tx,
        };

        Ok((reconciler, rx))
    }

    /// The configuration this reconciler runs with
    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Run passes until `shutdown` resolves
    ///
    /// The first pass starts immediately unless `shutdown` has already
    /// resolved. After that `shutdown` is only observed while idle, so a pass
    /// that has started always runs to completion.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        tokio::pin!(shutdown);

        info!(
            "Will check for IP changes every {} seconds",
            self.config.engine.check_interval.as_secs()
        );
        self.emit_event(ReconcileEvent::Started {
            record_id: self.config.record_id.clone(),
        });

        // No pass once shutdown was requested before the loop started
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                self.stop();
                return;
            }

            _ = std::future::ready(()) => {}
        }

        loop {
            self.run_pass().await;

            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    self.stop();
                    break;
                }

                _ = tokio::time::sleep(self.config.engine.check_interval) => {}
            }
        }
    }

    fn stop(&self) {
        info!("Reconcile loop interrupted, shutting down");
        self.emit_event(ReconcileEvent::Stopped {
            reason: "Shutdown signal".to_string(),
        });
    }

    /// Execute one fetch-compare-update pass
    ///
    /// Never issues a write without reading the record first.
    pub async fn reconcile_once(&self) -> Result<PassOutcome> {
        let current_ip = self.resolver.resolve().await?;
        info!("Current public IP: {}", current_ip);

        let record = self
            .client
            .read_record(&self.config.zone_id, &self.config.record_id)
            .await?;
        let published_ip = record.content;
        info!("Current DNS record IP: {}", published_ip);

        if current_ip == published_ip {
            return Ok(PassOutcome::Unchanged { ip: current_ip });
        }

        info!(
            "IP address has changed from {} to {}. Updating...",
            published_ip, current_ip
        );

        let update = RecordUpdate {
            record_type: self.config.record.record_type.clone(),
            name: self.config.record.name.clone().unwrap_or(record.name),
            content: current_ip.clone(),
            ttl: self.config.record.ttl,
            proxied: self.config.record.proxied,
        };

        self.client
            .update_record(&self.config.zone_id, &self.config.record_id, &update)
            .await?;

        Ok(PassOutcome::Updated {
            previous_ip: published_ip,
            new_ip: current_ip,
        })
    }

    /// Run one pass and log its result; errors stop here
    async fn run_pass(&self) {
        debug!(
            "Starting reconcile pass for record {} via {} and {}",
            self.config.record_id,
            self.resolver.resolver_name(),
            self.client.provider_name()
        );

        match self.reconcile_once().await {
            Ok(outcome) => {
                match &outcome {
                    PassOutcome::Unchanged { .. } => {
                        info!("IP address unchanged. No update needed.");
                    }
                    PassOutcome::Updated { new_ip, .. } => {
                        info!("Successfully updated DNS record to {}", new_ip);
                    }
                }
                self.emit_event(ReconcileEvent::PassSucceeded { outcome });
            }
            Err(e) => {
                match &e {
                    Error::Resolve(_) => error!("Error getting current IP: {}", e),
                    Error::Read(_) => error!("Failed to retrieve DNS record, skipping update: {}", e),
                    Error::UpdateRejected { provider, message } => {
                        error!("{} returned success=false for the update: {}", provider, message)
                    }
                    _ => error!("Failed to update DNS record: {}", e),
                }
                self.emit_event(ReconcileEvent::PassFailed { error: e });
            }
        }
    }

    /// Emit a loop event
    fn emit_event(&self, event: ReconcileEvent) {
        if let Err(mpsc::error::TrySendError::Full(_)) = self.event_tx.try_send(event) {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}
