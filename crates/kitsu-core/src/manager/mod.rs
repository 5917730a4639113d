//! History manager
//!
//! The `HistoryManager` orchestrates the remote client and the local store:
//! it validates input before any network call, merges server responses into
//! the ordered record list, deduplicates by short code, evicts on delete,
//! and exposes a consistent snapshot (list + highlighted record) to the
//! presentation layer.
//!
//! ## Operation Flow
//!
//! 1. Validate input (create/update only); rejection never reaches the network
//! 2. One remote round trip, performed *outside* the state lock
//! 3. On success: one atomic mutation under the write lock
//! 4. Write-through persistence while still holding the lock, so store
//!    writes are serialized
//! 5. Toast + event report the outcome
//!
//! ## Consistency
//!
//! Multiple operations may be in flight concurrently; each completion
//! mutates atomically, so completions never interleave mid-mutation.
//! Concurrent operations on the same short code are last-response-wins:
//! no per-record locking and no cancellation of superseded requests.
//! Network failures leave the collection untouched; storage failures are
//! logged and swallowed (the in-memory state remains authoritative for the
//! session).

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::model::{HistoryCollection, LinkRecord};
use crate::notify::Toasts;
use crate::traits::{HistoryStore, ShortenerApi};
use crate::validate::validate;

/// The record-targeted operations, for outcome reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Create a new short link
    Create,
    /// Delete a short link
    Delete,
    /// Change a link's target URL
    Update,
    /// Fetch a link's access count
    RefreshStats,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Delete => write!(f, "delete"),
            Operation::Update => write!(f, "update"),
            Operation::RefreshStats => write!(f, "stats"),
        }
    }
}

/// Events emitted by the manager for external observers
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEvent {
    /// A short link was created and inserted at the front
    Created {
        record: LinkRecord,
    },

    /// A short link was deleted
    Deleted {
        short_code: String,
    },

    /// A link's target URL was changed
    Updated {
        record: LinkRecord,
    },

    /// A link's access count was refreshed
    StatsRefreshed {
        short_code: String,
        access_count: u64,
    },

    /// The highlighted record was dismissed
    HighlightDismissed,

    /// An operation failed (validation or network)
    OperationFailed {
        operation: Operation,
        error: String,
    },
}

/// A consistent view of the manager's state
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    /// All records, most-recent-first
    pub records: Vec<LinkRecord>,
    /// The most recently created record, if not dismissed
    pub highlighted: Option<LinkRecord>,
}

/// Session state guarded by a single lock
#[derive(Debug, Default)]
struct SessionState {
    history: HistoryCollection,
    highlighted: Option<LinkRecord>,
}

/// Orchestrator for the link history
///
/// ## Lifecycle
///
/// 1. Create with [`HistoryManager::new()`]
/// 2. Call [`HistoryManager::initialize()`] once to load persisted history
/// 3. Drive operations from the presentation layer
///
/// The highlight is session-only; it is never persisted.
pub struct HistoryManager {
    /// Remote shortening service client
    api: Box<dyn ShortenerApi>,

    /// Durable mirror of the collection
    store: Box<dyn HistoryStore>,

    /// Collection + highlight, mutated only under the write lock
    state: RwLock<SessionState>,

    /// Outcome notifications for the presentation layer
    toasts: Toasts,

    /// How long each toast stays visible
    toast_duration: Duration,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<HistoryEvent>,
}

impl HistoryManager {
    /// Create a new manager
    ///
    /// # Returns
    ///
    /// A tuple of (manager, event_receiver) where the receiver yields one
    /// event per completed operation.
    pub fn new(
        api: Box<dyn ShortenerApi>,
        store: Box<dyn HistoryStore>,
        config: SyncConfig,
    ) -> Result<(Self, mpsc::Receiver<HistoryEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.event_channel_capacity);

        let manager = Self {
            api,
            store,
            state: RwLock::new(SessionState::default()),
            toasts: Toasts::new(),
            toast_duration: config.toast_duration(),
            event_tx: tx,
        };

        Ok((manager, rx))
    }

    /// Load the persisted history
    ///
    /// A missing or corrupt store yields an empty collection; loaded data is
    /// deduplicated by short code (first occurrence wins). Never fatal.
    ///
    /// # Returns
    ///
    /// The number of records loaded.
    pub async fn initialize(&self) -> usize {
        let records = match self.store.load().await {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to load history, starting empty: {}", e);
                Vec::new()
            }
        };

        let mut state = self.state.write().await;
        state.history = HistoryCollection::from_records(records);
        state.highlighted = None;

        info!("History initialized: {} records", state.history.len());
        state.history.len()
    }

    /// Create a short link for `raw_url`
    ///
    /// Validation runs first; a rejected URL produces no network call. On
    /// success the server's record is upserted at the front of the
    /// collection and becomes the highlighted record.
    pub async fn create(&self, raw_url: &str) -> Result<LinkRecord> {
        let url = match validate(raw_url) {
            Ok(url) => url,
            Err(reason) => return Err(self.reject(Operation::Create, reason)),
        };

        match self.api.create(&url).await {
            Ok(record) => {
                let mut state = self.state.write().await;
                state.history.upsert_front(record.clone());
                state.highlighted = Some(record.clone());
                self.persist(&state.history).await;
                drop(state);

                info!("Created short link {} -> {}", record.short_code, record.long_url);
                self.toasts.notify("Short link created", self.toast_duration);
                self.emit(HistoryEvent::Created {
                    record: record.clone(),
                });
                Ok(record)
            }
            Err(e) => Err(self.fail(Operation::Create, "Error creating short link", e)),
        }
    }

    /// Delete the short link with `short_code`
    ///
    /// On success the matching record is removed (no-op if absent) and the
    /// highlight is cleared if it referenced that code. On failure the
    /// collection is unchanged.
    pub async fn delete(&self, short_code: &str) -> Result<()> {
        match self.api.remove(short_code).await {
            Ok(()) => {
                let mut state = self.state.write().await;
                state.history.remove(short_code);
                if state
                    .highlighted
                    .as_ref()
                    .is_some_and(|r| r.short_code == short_code)
                {
                    state.highlighted = None;
                }
                self.persist(&state.history).await;
                drop(state);

                info!("Deleted short link {}", short_code);
                self.toasts.notify("Deleted", self.toast_duration);
                self.emit(HistoryEvent::Deleted {
                    short_code: short_code.to_string(),
                });
                Ok(())
            }
            Err(e) => Err(self.fail(Operation::Delete, "Error deleting", e)),
        }
    }

    /// Change the target URL of the link with `short_code`
    ///
    /// Validation runs first, with the same rules as create. On success the
    /// matching record's mutable fields are replaced in place from the
    /// server's canonical record, preserving its position in the ordering.
    /// If the record vanished locally while the call was in flight, the
    /// local mutation is a no-op but the operation still succeeds (the
    /// server applied it).
    pub async fn update(&self, short_code: &str, raw_url: &str) -> Result<LinkRecord> {
        let url = match validate(raw_url) {
            Ok(url) => url,
            Err(reason) => return Err(self.reject(Operation::Update, reason)),
        };

        match self.api.update(short_code, &url).await {
            Ok(canonical) => {
                let mut state = self.state.write().await;
                if let Some(existing) = state.history.get_mut(short_code) {
                    existing.long_url = canonical.long_url.clone();
                    existing.updated_at = canonical.updated_at.or_else(|| Some(Utc::now()));
                    if canonical.access_count.is_some() {
                        existing.access_count = canonical.access_count;
                    }
                } else {
                    debug!("Updated record {} no longer in local history", short_code);
                }
                self.persist(&state.history).await;
                drop(state);

                info!("Updated short link {} -> {}", short_code, canonical.long_url);
                self.toasts.notify("Updated", self.toast_duration);
                self.emit(HistoryEvent::Updated {
                    record: canonical.clone(),
                });
                Ok(canonical)
            }
            Err(e) => Err(self.fail(Operation::Update, "Error updating", e)),
        }
    }

    /// Fetch and store the access count for `short_code`
    ///
    /// Only the matching record's `access_count` changes; position and all
    /// other fields are untouched. Stats are pull-based and stale between
    /// fetches.
    pub async fn refresh_stats(&self, short_code: &str) -> Result<u64> {
        match self.api.stats(short_code).await {
            Ok(access_count) => {
                let mut state = self.state.write().await;
                if let Some(record) = state.history.get_mut(short_code) {
                    record.access_count = Some(access_count);
                }
                self.persist(&state.history).await;
                drop(state);

                debug!("Refreshed stats for {}: {} accesses", short_code, access_count);
                self.toasts.notify("Stats updated", self.toast_duration);
                self.emit(HistoryEvent::StatsRefreshed {
                    short_code: short_code.to_string(),
                    access_count,
                });
                Ok(access_count)
            }
            Err(e) => Err(self.fail(Operation::RefreshStats, "Error fetching stats", e)),
        }
    }

    /// Dismiss the highlighted record
    ///
    /// Clears the highlight only: the record stays in the collection, and
    /// neither the network nor the store is touched.
    pub async fn dismiss_highlight(&self) {
        let mut state = self.state.write().await;
        if state.highlighted.take().is_some() {
            drop(state);
            self.emit(HistoryEvent::HighlightDismissed);
        }
    }

    /// All records, most-recent-first
    pub async fn history(&self) -> Vec<LinkRecord> {
        self.state.read().await.history.records().to_vec()
    }

    /// The most recently created record, if not dismissed
    pub async fn highlighted(&self) -> Option<LinkRecord> {
        self.state.read().await.highlighted.clone()
    }

    /// A consistent view of records and highlight under one lock
    pub async fn snapshot(&self) -> HistorySnapshot {
        let state = self.state.read().await;
        HistorySnapshot {
            records: state.history.records().to_vec(),
            highlighted: state.highlighted.clone(),
        }
    }

    /// The public redirect URL for a short code (display-only)
    pub fn redirect_url(&self, short_code: &str) -> String {
        self.api.redirect_url(short_code)
    }

    /// Handle to the toast channel for the presentation layer
    pub fn toasts(&self) -> Toasts {
        self.toasts.clone()
    }

    /// Write the collection through to the store
    ///
    /// Called while holding the state write lock so writes are serialized.
    /// Failures are logged and swallowed: persistence must never block a
    /// user-visible operation that already succeeded in memory.
    async fn persist(&self, history: &HistoryCollection) {
        if let Err(e) = self.store.save(history.records()).await {
            warn!("Failed to persist history (continuing in memory): {}", e);
        }
    }

    /// Report a validation rejection: toast + event, no network call
    fn reject(&self, operation: Operation, reason: crate::error::ValidationError) -> Error {
        debug!("Rejected {} input: {}", operation, reason);
        self.toasts.notify(reason.to_string(), self.toast_duration);
        self.emit(HistoryEvent::OperationFailed {
            operation,
            error: reason.to_string(),
        });
        reason.into()
    }

    /// Report a failed remote call: toast + event, collection unchanged
    fn fail(&self, operation: Operation, toast_message: &str, error: Error) -> Error {
        warn!("{} failed: {}", operation, error);
        self.toasts.notify(toast_message, self.toast_duration);
        self.emit(HistoryEvent::OperationFailed {
            operation,
            error: error.to_string(),
        });
        error
    }

    /// Emit an event, dropping it with a warning if the channel is full
    fn emit(&self, event: HistoryEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("History event channel full, dropping event");
        }
    }
}
