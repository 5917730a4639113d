//! Trait seams for the sync layer
//!
//! - `ShortenerApi`: the remote shortening service (one request per call)
//! - `HistoryStore`: durable persistence of the ordered record list
//!
//! Both are object-safe and stateless from the manager's point of view, so
//! multiple pending operations may call them concurrently.

pub mod history_store;
pub mod shortener;

pub use history_store::HistoryStore;
pub use shortener::ShortenerApi;
