// # Notification Channel
//
// Short-lived, auto-expiring status messages (toasts) reporting the outcome
// of manager operations. Purely observational: holds no domain state.
//
// ## Semantics
//
// - Latest notification always wins; there is no queue
// - A toast clears itself after its duration elapses; expiry is checked on
//   read, so no background timer task is needed
// - The presentation layer subscribes via a watch channel and re-reads
//   `current()` when it wants to render

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Default toast duration (matches the original UI)
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(1800);

/// One displayed status message
#[derive(Debug, Clone)]
pub struct Toast {
    message: String,
    expires_at: Instant,
}

impl Toast {
    /// The message text
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the toast has outlived its duration
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Latest-wins channel of auto-expiring toasts
///
/// Clones share the same underlying channel.
#[derive(Debug, Clone)]
pub struct Toasts {
    tx: watch::Sender<Option<Toast>>,
}

impl Toasts {
    /// Create an empty toast channel
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Display `message` for `duration`, superseding any current toast
    pub fn notify(&self, message: impl Into<String>, duration: Duration) {
        let toast = Toast {
            message: message.into(),
            expires_at: Instant::now() + duration,
        };
        // send_replace never fails: the sender keeps the channel alive even
        // with no subscribers
        self.tx.send_replace(Some(toast));
    }

    /// The currently displayed toast, or `None` if absent or expired
    pub fn current(&self) -> Option<Toast> {
        self.tx
            .borrow()
            .clone()
            .filter(|toast| !toast.is_expired())
    }

    /// Subscribe to toast changes
    ///
    /// Receivers observe every `notify`; expired toasts still need to be
    /// filtered on the consumer side (or re-read through `current()`).
    pub fn subscribe(&self) -> watch::Receiver<Option<Toast>> {
        self.tx.subscribe()
    }
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new()
    }
}
