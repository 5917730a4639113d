// # kitsu-core
//
// Client-side history synchronization for the Kitsu link shortener.
//
// ## Architecture Overview
//
// - **validate**: pure URL validation, applied before any network call
// - **ShortenerApi**: trait for the remote shortening service (one request
//   per call, no retries)
// - **HistoryStore**: trait for durable persistence of the ordered record
//   list (single key, write-through)
// - **HistoryManager**: orchestrator owning the collection and the
//   highlighted record; merges server responses, dedups by short code,
//   persists after every mutation
// - **Toasts**: latest-wins, auto-expiring outcome notifications
//
// ## Design Principles
//
// 1. **Validation first**: rejected input never produces a request
// 2. **Atomic mutation**: each operation is one bounded network round trip
//    followed by one synchronous collection update; completions never
//    interleave mid-mutation
// 3. **Write-through**: memory and store are equal after every mutating
//    operation
// 4. **No partial failure**: a failed remote call leaves the collection
//    byte-for-byte unchanged
// 5. **Last-response-wins**: concurrent operations on the same record are an
//    accepted weak-consistency policy, not masked by locking

pub mod config;
pub mod error;
pub mod manager;
pub mod model;
pub mod notify;
pub mod store;
pub mod traits;
pub mod validate;

// Re-export core types for convenience
pub use config::{StoreConfig, SyncConfig};
pub use error::{Error, Result, ValidationError};
pub use manager::{HistoryEvent, HistoryManager, HistorySnapshot, Operation};
pub use model::{HistoryCollection, LinkRecord};
pub use notify::{Toast, Toasts, DEFAULT_TOAST_DURATION};
pub use store::{FileHistoryStore, MemoryHistoryStore};
pub use traits::{HistoryStore, ShortenerApi};
pub use validate::validate;
