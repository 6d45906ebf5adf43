//! Test doubles and common utilities for reconcile contract tests
//!
//! The doubles count every call so tests can assert which network
//! interactions a pass performed.

#![allow(dead_code)]

use dyndns_core::config::{DdnsConfig, EngineConfig, ReconcileConfig, RecordConfig};
use dyndns_core::error::{Error, Result};
use dyndns_core::traits::{DnsRecord, DnsRecordClient, IpResolver, RecordUpdate};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// An IpResolver that replays a script of answers
///
/// Answers are consumed in order; the last one repeats forever.
pub struct ScriptedResolver {
    answers: Arc<Mutex<VecDeque<Result<String>>>>,
    resolve_call_count: Arc<AtomicUsize>,
}

impl ScriptedResolver {
    pub fn new(answers: Vec<Result<String>>) -> Self {
        assert!(!answers.is_empty(), "script needs at least one answer");
        Self {
            answers: Arc::new(Mutex::new(answers.into())),
            resolve_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always answer with the same IP
    pub fn fixed(ip: &str) -> Self {
        Self::new(vec![Ok(ip.to_string())])
    }

    /// Always fail
    pub fn failing() -> Self {
        Self::new(vec![Err(Error::resolve("echo service unreachable"))])
    }

    /// Get the number of times resolve() was called
    pub fn resolve_call_count(&self) -> usize {
        self.resolve_call_count.load(Ordering::SeqCst)
    }

    /// Create a new ScriptedResolver that shares script and counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            answers: Arc::clone(&other.answers),
            resolve_call_count: Arc::clone(&other.resolve_call_count),
        }
    }
}

#[async_trait::async_trait]
impl IpResolver for ScriptedResolver {
    async fn resolve(&self) -> Result<String> {
        self.resolve_call_count.fetch_add(1, Ordering::SeqCst);

        let mut answers = self.answers.lock().unwrap();
        if answers.len() > 1 {
            answers.pop_front().unwrap()
        } else {
            answers.front().cloned().unwrap()
        }
    }

    fn resolver_name(&self) -> &'static str {
        "scripted"
    }
}

/// A DnsRecordClient that tracks calls and serves canned responses
pub struct MockRecordClient {
    /// Record served by read_record(); None makes reads fail
    record: Arc<Mutex<Option<DnsRecord>>>,
    /// Answer for find_record_id()
    discovery: Arc<Mutex<Result<String>>>,
    /// Answer for update_record()
    update_result: Arc<Mutex<Result<()>>>,
    /// Artificial latency for read_record()
    read_delay: Duration,
    find_call_count: Arc<AtomicUsize>,
    read_call_count: Arc<AtomicUsize>,
    update_call_count: Arc<AtomicUsize>,
    /// Bodies passed to update_record()
    updates: Arc<Mutex<Vec<RecordUpdate>>>,
}

impl MockRecordClient {
    /// A client whose record currently publishes `content`
    pub fn with_content(content: &str) -> Self {
        Self {
            record: Arc::new(Mutex::new(Some(record("abc123", content)))),
            discovery: Arc::new(Mutex::new(Ok("abc123".to_string()))),
            update_result: Arc::new(Mutex::new(Ok(()))),
            read_delay: Duration::ZERO,
            find_call_count: Arc::new(AtomicUsize::new(0)),
            read_call_count: Arc::new(AtomicUsize::new(0)),
            update_call_count: Arc::new(AtomicUsize::new(0)),
            updates: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A client whose reads always fail
    pub fn unreadable() -> Self {
        let client = Self::with_content("0.0.0.0");
        *client.record.lock().unwrap() = None;
        client
    }

    pub fn with_discovery(self, answer: Result<String>) -> Self {
        *self.discovery.lock().unwrap() = answer;
        self
    }

    pub fn with_update_result(self, answer: Result<()>) -> Self {
        *self.update_result.lock().unwrap() = answer;
        self
    }

    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = delay;
        self
    }

    pub fn find_call_count(&self) -> usize {
        self.find_call_count.load(Ordering::SeqCst)
    }

    pub fn read_call_count(&self) -> usize {
        self.read_call_count.load(Ordering::SeqCst)
    }

    pub fn update_call_count(&self) -> usize {
        self.update_call_count.load(Ordering::SeqCst)
    }

    /// Get the list of update bodies that were sent
    pub fn updates(&self) -> Vec<RecordUpdate> {
        self.updates.lock().unwrap().clone()
    }

    /// Create a new MockRecordClient that shares state and counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            record: Arc::clone(&other.record),
            discovery: Arc::clone(&other.discovery),
            update_result: Arc::clone(&other.update_result),
            read_delay: other.read_delay,
            find_call_count: Arc::clone(&other.find_call_count),
            read_call_count: Arc::clone(&other.read_call_count),
            update_call_count: Arc::clone(&other.update_call_count),
            updates: Arc::clone(&other.updates),
        }
    }
}

#[async_trait::async_trait]
impl DnsRecordClient for MockRecordClient {
    async fn find_record_id(&self, _zone_id: &str, _name: &str, _record_type: &str) -> Result<String> {
        self.find_call_count.fetch_add(1, Ordering::SeqCst);
        self.discovery.lock().unwrap().clone()
    }

    async fn read_record(&self, _zone_id: &str, record_id: &str) -> Result<DnsRecord> {
        self.read_call_count.fetch_add(1, Ordering::SeqCst);

        if !self.read_delay.is_zero() {
            tokio::time::sleep(self.read_delay).await;
        }

        self.record
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::read(format!("DNS record not found: {record_id}")))
    }

    async fn update_record(&self, _zone_id: &str, _record_id: &str, update: &RecordUpdate) -> Result<()> {
        self.update_call_count.fetch_add(1, Ordering::SeqCst);
        self.updates.lock().unwrap().push(update.clone());

        let result = self.update_result.lock().unwrap().clone();
        if result.is_ok() {
            if let Some(record) = self.record.lock().unwrap().as_mut() {
                record.content = update.content.clone();
            }
        }
        result
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A provider-shaped record as the mock client serves it
pub fn record(id: &str, content: &str) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        record_type: "A".to_string(),
        name: "home.example.com".to_string(),
        content: content.to_string(),
        ttl: Some(3600),
        proxied: Some(false),
    }
}

/// Helper to create a resolved config for record "abc123" with no domain name
pub fn minimal_config() -> ReconcileConfig {
    ReconcileConfig {
        zone_id: "zone".to_string(),
        record_id: "abc123".to_string(),
        record: RecordConfig::default(),
        engine: fast_engine(),
    }
}

/// Helper to create an unresolved config
pub fn startup_config(record_id: Option<&str>, name: Option<&str>) -> DdnsConfig {
    let mut config = DdnsConfig::new("zone").with_engine(fast_engine());
    config.record_id = record_id.map(str::to_string);
    config.record.name = name.map(str::to_string);
    config
}

/// Engine settings with a short tick for loop tests
pub fn fast_engine() -> EngineConfig {
    EngineConfig {
        check_interval: Duration::from_millis(20),
        event_channel_capacity: 100,
    }
}
