// # Memory History Store
//
// In-memory implementation of HistoryStore. Nothing survives a restart;
// useful for tests and sessions where persistence isn't wanted.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::model::LinkRecord;
use crate::traits::HistoryStore;

/// In-memory history store
///
/// Clones share the same backing storage, which lets tests hold a handle to
/// a store owned by the manager.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    inner: Arc<RwLock<Vec<LinkRecord>>>,
}

impl MemoryHistoryStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted records
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn load(&self) -> Result<Vec<LinkRecord>> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, records: &[LinkRecord]) -> Result<()> {
        *self.inner.write().await = records.to_vec();
        Ok(())
    }
}
