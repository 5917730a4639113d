//! Test doubles and common utilities for the sync contract tests
//!
//! The doubles track call counts with shared atomic counters so a test can
//! keep a handle to the same instance it boxed into the manager.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::oneshot;

use kitsu_core::config::SyncConfig;
use kitsu_core::error::{Error, Result};
use kitsu_core::model::LinkRecord;
use kitsu_core::store::MemoryHistoryStore;
use kitsu_core::traits::{HistoryStore, ShortenerApi};

/// A scripted ShortenerApi that records calls
///
/// Clones share counters and scripting, so tests can hold a handle to the
/// instance the manager owns.
#[derive(Clone)]
pub struct MockShortenerApi {
    create_calls: Arc<AtomicUsize>,
    remove_calls: Arc<AtomicUsize>,
    update_calls: Arc<AtomicUsize>,
    stats_calls: Arc<AtomicUsize>,
    /// When set, every remote call fails with a network error
    fail_all: Arc<AtomicBool>,
    /// Short codes handed out by successive create calls
    scripted_codes: Arc<std::sync::Mutex<VecDeque<String>>>,
    /// Value returned by stats calls
    stats_value: Arc<AtomicU64>,
    /// Completion gates consumed by update calls in issue order
    update_gates: Arc<std::sync::Mutex<VecDeque<oneshot::Receiver<()>>>>,
}

impl MockShortenerApi {
    pub fn new() -> Self {
        Self {
            create_calls: Arc::new(AtomicUsize::new(0)),
            remove_calls: Arc::new(AtomicUsize::new(0)),
            update_calls: Arc::new(AtomicUsize::new(0)),
            stats_calls: Arc::new(AtomicUsize::new(0)),
            fail_all: Arc::new(AtomicBool::new(false)),
            scripted_codes: Arc::new(std::sync::Mutex::new(VecDeque::new())),
            stats_value: Arc::new(AtomicU64::new(0)),
            update_gates: Arc::new(std::sync::Mutex::new(VecDeque::new())),
        }
    }

    /// Queue the short code returned by the next create call
    pub fn script_code(&self, code: &str) {
        self.scripted_codes
            .lock()
            .unwrap()
            .push_back(code.to_string());
    }

    /// Make every subsequent remote call fail
    pub fn fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Set the access count returned by stats calls
    pub fn set_stats(&self, value: u64) {
        self.stats_value.store(value, Ordering::SeqCst);
    }

    /// Add a completion gate: the next update call (in issue order) will not
    /// return until the corresponding sender fires
    pub fn gate_next_update(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.update_gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// Total remote invocations across all four operations
    pub fn total_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
            + self.remove_calls.load(Ordering::SeqCst)
            + self.update_calls.load(Ordering::SeqCst)
            + self.stats_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<()> {
        if self.fail_all.load(Ordering::SeqCst) {
            Err(Error::network("simulated network failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ShortenerApi for MockShortenerApi {
    async fn create(&self, url: &str) -> Result<LinkRecord> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;

        let code = self
            .scripted_codes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| format!("code{}", self.create_calls()));
        Ok(LinkRecord::new(code, url))
    }

    async fn remove(&self, _short_code: &str) -> Result<()> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()
    }

    async fn update(&self, short_code: &str, url: &str) -> Result<LinkRecord> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);

        // Take the next gate before failing so gating and failure compose
        let gate = self.update_gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            gate.await.expect("update gate dropped");
        }

        self.check_failure()?;
        Ok(LinkRecord {
            short_code: short_code.to_string(),
            long_url: url.to_string(),
            created_at: Utc::now(),
            updated_at: Some(Utc::now()),
            access_count: None,
        })
    }

    async fn stats(&self, _short_code: &str) -> Result<u64> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(self.stats_value.load(Ordering::SeqCst))
    }

    fn redirect_url(&self, short_code: &str) -> String {
        format!("http://short.test/shorten/r/{}", short_code)
    }
}

/// A HistoryStore double that counts saves and can fail loads
#[derive(Clone)]
pub struct CountingStore {
    inner: MemoryHistoryStore,
    save_calls: Arc<AtomicUsize>,
    fail_loads: Arc<AtomicBool>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryHistoryStore::new(),
            save_calls: Arc::new(AtomicUsize::new(0)),
            fail_loads: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// What is currently persisted
    pub async fn persisted(&self) -> Vec<LinkRecord> {
        self.inner.load().await.unwrap()
    }

    /// Seed the store before the manager initializes
    pub async fn seed(&self, records: &[LinkRecord]) {
        self.inner.save(records).await.unwrap();
    }
}

#[async_trait]
impl HistoryStore for CountingStore {
    async fn load(&self) -> Result<Vec<LinkRecord>> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(Error::storage("simulated storage failure"));
        }
        self.inner.load().await
    }

    async fn save(&self, records: &[LinkRecord]) -> Result<()> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.save(records).await
    }
}

/// A minimal SyncConfig for tests
pub fn test_config() -> SyncConfig {
    SyncConfig {
        event_channel_capacity: 100,
        ..SyncConfig::default()
    }
}
