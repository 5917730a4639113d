// # Shortener API Trait
//
// Defines the interface to the remote shortening service.
//
// ## Implementations
//
// - HTTP: `kitsu-api-http` crate
// - Test doubles: `tests/common/mod.rs`
//
// ## Responsibility split
//
// Implementations are stateless, single-shot wrappers: one request/response
// round trip per call, idempotent request construction, no side effects on
// failure. Retries, if desired, are a policy decision left to the caller;
// this layer performs none. Merging a response into local state is owned by
// the `HistoryManager`.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::LinkRecord;

/// Trait for remote shortening service clients
///
/// # Thread Safety
///
/// Implementations must be safe to call concurrently from multiple pending
/// operations; the manager never serializes remote calls.
#[async_trait]
pub trait ShortenerApi: Send + Sync {
    /// Create a short link for an already-validated URL
    ///
    /// # Returns
    ///
    /// - `Ok(LinkRecord)`: the server's record for the new link
    /// - `Err(Error::Network)`: any non-success response
    async fn create(&self, url: &str) -> Result<LinkRecord>;

    /// Delete a short link
    ///
    /// Succeeds only on an explicit "no content" response; any other
    /// outcome is a network error.
    async fn remove(&self, short_code: &str) -> Result<()>;

    /// Change the target URL of an existing short link
    ///
    /// # Returns
    ///
    /// - `Ok(LinkRecord)`: the server's canonical record, authoritative over
    ///   any locally held copy
    /// - `Err(Error::Network)`: any non-success response
    async fn update(&self, short_code: &str, url: &str) -> Result<LinkRecord>;

    /// Fetch the current access count for a short link
    async fn stats(&self, short_code: &str) -> Result<u64>;

    /// The public redirect URL for a short code
    ///
    /// Display-only: constructs the address a visitor would follow, without
    /// performing any I/O.
    fn redirect_url(&self, short_code: &str) -> String;
}
