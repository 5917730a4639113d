// # File History Store
//
// File-based implementation of HistoryStore with crash recovery.
//
// ## Crash Recovery
//
// - Atomic writes: new content goes to a temporary file, then a rename
// - Automatic backup: the last known good file is kept as `.backup`
// - Corruption detection: JSON is validated on load
// - Fallback: corrupt main file falls back to the backup; if both are
//   unreadable the store reports an empty history rather than an error
//
// ## File Format
//
// ```json
// {
//   "version": "1",
//   "records": [
//     {
//       "shortCode": "abc1",
//       "longUrl": "https://example.com/page",
//       "createdAt": "2025-01-09T12:00:00Z"
//     }
//   ]
// }
// ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};
use crate::model::LinkRecord;
use crate::traits::HistoryStore;

/// History file format version, for future migration
const HISTORY_FILE_VERSION: &str = "1";

/// Serializable history file format
#[derive(Debug, Serialize, Deserialize)]
struct HistoryFileFormat {
    version: String,
    records: Vec<LinkRecord>,
}

/// File-based history store with atomic writes and backup recovery
///
/// # Example
///
/// ```rust,no_run
/// use kitsu_core::store::FileHistoryStore;
/// use kitsu_core::traits::HistoryStore;
/// use kitsu_core::LinkRecord;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileHistoryStore::new("~/.kitsu/history.json").await?;
///
///     store.save(&[LinkRecord::new("abc1", "https://example.com/")]).await?;
///     let records = store.load().await?;
///     assert_eq!(records.len(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileHistoryStore {
    path: PathBuf,
}

impl FileHistoryStore {
    /// Create a file history store, creating parent directories if needed
    ///
    /// The file itself is not created until the first save; a missing file
    /// simply loads as an empty history.
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::storage(format!(
                        "Failed to create history directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        Ok(Self { path })
    }

    /// Path to the store's backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse one candidate file
    async fn read_file(path: &Path) -> Result<Vec<LinkRecord>> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::storage(format!("Failed to read history file {}: {}", path.display(), e))
        })?;

        let parsed: HistoryFileFormat = serde_json::from_str(&content).map_err(|e| {
            Error::storage(format!(
                "Failed to parse history file {}: {}",
                path.display(),
                e
            ))
        })?;

        if parsed.version != HISTORY_FILE_VERSION {
            tracing::warn!(
                "History file version mismatch: expected {}, got {}. Loading anyway.",
                HISTORY_FILE_VERSION,
                parsed.version
            );
        }

        Ok(parsed.records)
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl HistoryStore for FileHistoryStore {
    /// Load the persisted history, falling back on the backup and finally on
    /// an empty list
    ///
    /// Never returns an error for missing or corrupt data: a broken history
    /// file must not block startup.
    async fn load(&self) -> Result<Vec<LinkRecord>> {
        if !self.path.exists() {
            tracing::debug!("History file does not exist: {}", self.path.display());
            return Ok(Vec::new());
        }

        match Self::read_file(&self.path).await {
            Ok(records) => {
                tracing::debug!("Loaded history: {} records", records.len());
                return Ok(records);
            }
            Err(e) => {
                tracing::warn!(
                    "History file unreadable: {}. Attempting recovery from backup.",
                    e
                );
            }
        }

        let backup = Self::backup_path(&self.path);
        if backup.exists() {
            match Self::read_file(&backup).await {
                Ok(records) => {
                    tracing::info!("Recovered history from backup: {} records", records.len());
                    return Ok(records);
                }
                Err(e) => {
                    tracing::error!("Backup also unreadable: {}. Starting empty.", e);
                }
            }
        } else {
            tracing::warn!("No backup file found. Starting with empty history.");
        }

        Ok(Vec::new())
    }

    /// Write the full record list atomically
    async fn save(&self, records: &[LinkRecord]) -> Result<()> {
        let file = HistoryFileFormat {
            version: HISTORY_FILE_VERSION.to_string(),
            records: records.to_vec(),
        };

        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| Error::storage(format!("Failed to serialize history: {}", e)))?;

        // Write to a temporary file first
        let temp_path = self.temp_path();
        {
            let mut f = fs::File::create(&temp_path).await.map_err(|e| {
                Error::storage(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            f.write_all(json.as_bytes()).await.map_err(|e| {
                Error::storage(format!(
                    "Failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            f.flush().await.map_err(|e| {
                Error::storage(format!(
                    "Failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        // Keep the last known good state around before replacing it
        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create history backup: {}", e);
            }
        }

        // Atomic rename (temp -> actual)
        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::storage(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!(
            "History written: {} records to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }
}
