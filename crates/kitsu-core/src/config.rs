//! Configuration types for the sync layer

use serde::{Deserialize, Serialize};

/// Sync layer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// History store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Capacity of the outbound history event channel
    ///
    /// When full, new events are dropped (with a warning log) rather than
    /// blocking an operation mid-completion.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// How long a toast stays visible, in milliseconds
    #[serde(default = "default_toast_duration_ms")]
    pub toast_duration_ms: u64,
}

impl SyncConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        if self.toast_duration_ms == 0 {
            return Err(crate::Error::config("Toast duration must be > 0"));
        }
        self.store.validate()?;
        Ok(())
    }

    /// Toast duration as a `Duration`
    pub fn toast_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.toast_duration_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            event_channel_capacity: default_event_channel_capacity(),
            toast_duration_ms: default_toast_duration_ms(),
        }
    }
}

/// History store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    /// File-based store (durable across restarts)
    File {
        /// Path to the history file
        path: String,
    },

    /// In-memory store (not persistent)
    #[default]
    Memory,
}

impl StoreConfig {
    /// Validate the store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            StoreConfig::File { path } => {
                if path.is_empty() {
                    return Err(crate::Error::config("History file path cannot be empty"));
                }
                Ok(())
            }
            StoreConfig::Memory => Ok(()),
        }
    }
}

fn default_event_channel_capacity() -> usize {
    64
}

fn default_toast_duration_ms() -> u64 {
    1800
}
