// # History Store Trait
//
// Defines the interface for durable persistence of the link history.
//
// ## Purpose
//
// The store holds the JSON-serialized ordered record list under a single
// durable key so the history survives process restarts. It is a dumb mirror:
// ordering, dedup and merge decisions are owned by the `HistoryManager`,
// which writes the full list through after every mutation.
//
// ## Implementations
//
// - File-based: `store::FileHistoryStore` (atomic writes, backup recovery)
// - In-memory: `store::MemoryHistoryStore` (tests, ephemeral sessions)

use async_trait::async_trait;

use crate::error::Result;
use crate::model::LinkRecord;

/// Trait for history persistence backends
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks. The
/// manager serializes its own writes, but reads may overlap them.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Load the persisted record list
    ///
    /// Missing or corrupt data yields `Ok(vec![])`, never an error: a broken
    /// history must not block startup.
    async fn load(&self) -> Result<Vec<LinkRecord>>;

    /// Replace the persisted record list with `records`
    ///
    /// Order must be preserved exactly as given.
    async fn save(&self, records: &[LinkRecord]) -> Result<()>;
}
