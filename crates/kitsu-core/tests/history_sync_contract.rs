//! Contract tests for the history synchronization flow
//!
//! Verifies the manager's core guarantees:
//! - Validation resolves locally, before any network call
//! - Successful operations upsert/evict with write-through persistence
//! - Failed remote calls leave the collection byte-for-byte unchanged
//! - The highlight always tracks the most recently created record

mod common;

use common::*;
use kitsu_core::{HistoryEvent, HistoryManager, Operation};
use tokio::sync::mpsc;

fn manager_with(
    api: &MockShortenerApi,
    store: &CountingStore,
) -> (HistoryManager, mpsc::Receiver<HistoryEvent>) {
    HistoryManager::new(
        Box::new(api.clone()),
        Box::new(store.clone()),
        test_config(),
    )
    .expect("manager construction succeeds")
}

#[tokio::test]
async fn create_prepends_and_highlights() {
    let api = MockShortenerApi::new();
    let store = CountingStore::new();
    api.script_code("abc1");

    let (manager, mut events) = manager_with(&api, &store);
    manager.initialize().await;

    let record = manager
        .create("https://example.com/page")
        .await
        .expect("create succeeds");

    let snapshot = manager.snapshot().await;
    assert_eq!(snapshot.records.len(), 1);
    assert_eq!(snapshot.records[0].short_code, "abc1");
    assert_eq!(snapshot.records[0].long_url, "https://example.com/page");
    assert_eq!(snapshot.highlighted.as_ref(), Some(&snapshot.records[0]));

    // Write-through: the store mirrors memory immediately
    assert_eq!(store.persisted().await, snapshot.records);

    assert_eq!(events.recv().await, Some(HistoryEvent::Created { record }));
}

#[tokio::test]
async fn create_normalizes_before_sending() {
    let api = MockShortenerApi::new();
    let store = CountingStore::new();

    let (manager, _events) = manager_with(&api, &store);
    manager.initialize().await;

    let record = manager
        .create("  HTTPS://Example.COM  ")
        .await
        .expect("create succeeds");

    // The parser's serialization, not the raw trimmed input
    assert_eq!(record.long_url, "https://example.com/");
}

#[tokio::test]
async fn duplicate_code_is_upserted_not_duplicated() {
    let api = MockShortenerApi::new();
    let store = CountingStore::new();
    api.script_code("abc1");
    api.script_code("def2");
    api.script_code("abc1");

    let (manager, _events) = manager_with(&api, &store);
    manager.initialize().await;

    manager.create("https://a.example/").await.unwrap();
    manager.create("https://b.example/").await.unwrap();
    manager.create("https://a2.example/").await.unwrap();

    let records = manager.history().await;
    assert_eq!(records.len(), 2, "duplicate code must replace, not duplicate");
    assert_eq!(records[0].short_code, "abc1");
    assert_eq!(records[0].long_url, "https://a2.example/");
    assert_eq!(records[1].short_code, "def2");
}

#[tokio::test]
async fn invalid_input_never_reaches_network() {
    let api = MockShortenerApi::new();
    let store = CountingStore::new();

    let (manager, mut events) = manager_with(&api, &store);
    manager.initialize().await;
    let toasts = manager.toasts();

    let err = manager.create("not a url").await.unwrap_err();
    assert!(err.is_validation());

    assert!(manager.create("").await.unwrap_err().is_validation());
    assert!(manager.create("ftp://x.com").await.unwrap_err().is_validation());
    assert!(
        manager
            .update("abc1", "still not a url")
            .await
            .unwrap_err()
            .is_validation()
    );

    assert_eq!(api.total_calls(), 0, "validation must short-circuit the network");
    assert_eq!(store.save_calls(), 0, "rejected input must not persist anything");
    assert!(manager.history().await.is_empty());

    // The rejection reason surfaces as a toast and an event
    assert!(toasts.current().is_some());
    match events.recv().await {
        Some(HistoryEvent::OperationFailed { operation, error }) => {
            assert_eq!(operation, Operation::Create);
            assert_eq!(error, "Please enter a valid URL");
        }
        other => panic!("expected OperationFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn delete_evicts_and_clears_highlight() {
    let api = MockShortenerApi::new();
    let store = CountingStore::new();
    api.script_code("abc1");

    let (manager, _events) = manager_with(&api, &store);
    manager.initialize().await;

    manager.create("https://a.example/").await.unwrap();
    assert!(manager.highlighted().await.is_some());

    manager.delete("abc1").await.expect("delete succeeds");

    let snapshot = manager.snapshot().await;
    assert!(snapshot.records.iter().all(|r| r.short_code != "abc1"));
    assert!(snapshot.highlighted.is_none(), "highlight referenced the deleted code");
    assert!(store.persisted().await.is_empty());
}

#[tokio::test]
async fn delete_of_other_code_keeps_highlight() {
    let api = MockShortenerApi::new();
    let store = CountingStore::new();
    api.script_code("abc1");
    api.script_code("def2");

    let (manager, _events) = manager_with(&api, &store);
    manager.initialize().await;

    manager.create("https://a.example/").await.unwrap();
    manager.create("https://b.example/").await.unwrap();

    manager.delete("abc1").await.unwrap();

    let highlighted = manager.highlighted().await.expect("highlight survives");
    assert_eq!(highlighted.short_code, "def2");
}

#[tokio::test]
async fn failed_delete_leaves_collection_unchanged() {
    let api = MockShortenerApi::new();
    let store = CountingStore::new();
    api.script_code("abc1");

    let (manager, _events) = manager_with(&api, &store);
    manager.initialize().await;
    manager.create("https://a.example/").await.unwrap();

    let before = manager.snapshot().await;
    let saves_before = store.save_calls();

    api.fail_all(true);
    let err = manager.delete("abc1").await.unwrap_err();
    assert!(matches!(err, kitsu_core::Error::Network(_)));

    assert_eq!(manager.snapshot().await, before);
    assert_eq!(store.save_calls(), saves_before, "no persistence on failure");
}

#[tokio::test]
async fn failed_update_leaves_entry_unchanged() {
    let api = MockShortenerApi::new();
    let store = CountingStore::new();
    api.script_code("xyz9");

    let (manager, mut events) = manager_with(&api, &store);
    manager.initialize().await;
    manager.create("https://old.example/").await.unwrap();

    let before = manager.history().await[0].clone();

    api.fail_all(true);
    let err = manager
        .update("xyz9", "https://new.example/path")
        .await
        .unwrap_err();
    assert!(matches!(err, kitsu_core::Error::Network(_)));

    // Entry is untouched, field for field
    assert_eq!(manager.history().await[0], before);

    // Skip the Created event, then expect the failure report
    let _ = events.recv().await;
    match events.recv().await {
        Some(HistoryEvent::OperationFailed { operation, .. }) => {
            assert_eq!(operation, Operation::Update);
        }
        other => panic!("expected OperationFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn update_replaces_fields_in_place() {
    let api = MockShortenerApi::new();
    let store = CountingStore::new();
    api.script_code("abc1");
    api.script_code("def2");

    let (manager, _events) = manager_with(&api, &store);
    manager.initialize().await;

    manager.create("https://a.example/").await.unwrap();
    manager.create("https://b.example/").await.unwrap();
    let created_at = manager.history().await[1].created_at;

    manager
        .update("abc1", "https://a-new.example/path")
        .await
        .expect("update succeeds");

    let records = manager.history().await;
    // Position preserved: abc1 is still second, not moved to the front
    assert_eq!(records[0].short_code, "def2");
    assert_eq!(records[1].short_code, "abc1");
    assert_eq!(records[1].long_url, "https://a-new.example/path");
    assert!(records[1].updated_at.is_some());
    assert_eq!(records[1].created_at, created_at, "created_at is immutable");

    assert_eq!(store.persisted().await, records);
}

#[tokio::test]
async fn stats_touch_only_access_count() {
    let api = MockShortenerApi::new();
    let store = CountingStore::new();
    api.script_code("abc1");
    api.script_code("def2");
    api.set_stats(42);

    let (manager, _events) = manager_with(&api, &store);
    manager.initialize().await;

    manager.create("https://a.example/").await.unwrap();
    manager.create("https://b.example/").await.unwrap();
    let before = manager.history().await;

    let count = manager.refresh_stats("abc1").await.unwrap();
    assert_eq!(count, 42);

    let after = manager.history().await;
    assert_eq!(after[1].access_count, Some(42));
    // Everything else identical, including ordering
    assert_eq!(after[0], before[0]);
    assert_eq!(after[1].short_code, before[1].short_code);
    assert_eq!(after[1].long_url, before[1].long_url);
    assert_eq!(after[1].created_at, before[1].created_at);
    assert_eq!(after[1].updated_at, before[1].updated_at);
}

#[tokio::test]
async fn dismiss_highlight_keeps_the_record() {
    let api = MockShortenerApi::new();
    let store = CountingStore::new();
    api.script_code("abc1");

    let (manager, _events) = manager_with(&api, &store);
    manager.initialize().await;
    manager.create("https://a.example/").await.unwrap();

    let saves_before = store.save_calls();
    manager.dismiss_highlight().await;

    assert!(manager.highlighted().await.is_none());
    assert_eq!(manager.history().await.len(), 1, "dismissal never evicts");
    assert_eq!(store.save_calls(), saves_before, "dismissal never persists");
}

#[tokio::test]
async fn initialize_loads_and_dedups_persisted_history() {
    let api = MockShortenerApi::new();
    let store = CountingStore::new();

    let newer = kitsu_core::LinkRecord::new("abc1", "https://new.example/");
    let other = kitsu_core::LinkRecord::new("def2", "https://b.example/");
    let stale = kitsu_core::LinkRecord::new("abc1", "https://old.example/");
    store.seed(&[newer.clone(), other.clone(), stale]).await;

    let (manager, _events) = manager_with(&api, &store);
    let loaded = manager.initialize().await;

    assert_eq!(loaded, 2, "duplicate code collapses on load");
    let records = manager.history().await;
    assert_eq!(records, vec![newer, other]);
    assert!(manager.highlighted().await.is_none(), "highlight is session-only");
}

#[tokio::test]
async fn initialize_swallows_storage_failure() {
    let api = MockShortenerApi::new();
    let store = CountingStore::new();
    store.seed(&[kitsu_core::LinkRecord::new("abc1", "https://a.example/")]).await;
    store.fail_loads(true);

    let (manager, _events) = manager_with(&api, &store);
    let loaded = manager.initialize().await;

    assert_eq!(loaded, 0, "storage failure falls back to empty, never errors");
    assert!(manager.history().await.is_empty());
}

#[tokio::test]
async fn storage_failure_does_not_fail_the_operation() {
    // A store that always rejects writes: the operation still succeeds in
    // memory and the session stays usable.
    let api = MockShortenerApi::new();
    api.script_code("abc1");

    struct RejectingStore;
    #[async_trait::async_trait]
    impl kitsu_core::traits::HistoryStore for RejectingStore {
        async fn load(&self) -> kitsu_core::Result<Vec<kitsu_core::LinkRecord>> {
            Ok(Vec::new())
        }
        async fn save(&self, _records: &[kitsu_core::LinkRecord]) -> kitsu_core::Result<()> {
            Err(kitsu_core::Error::storage("disk full"))
        }
    }

    let (manager, _events) = HistoryManager::new(
        Box::new(api.clone()),
        Box::new(RejectingStore),
        test_config(),
    )
    .unwrap();
    manager.initialize().await;

    let record = manager
        .create("https://a.example/")
        .await
        .expect("storage failure must not surface");
    assert_eq!(record.short_code, "abc1");
    assert_eq!(manager.history().await.len(), 1);
}

#[tokio::test]
async fn toasts_report_outcomes() {
    let api = MockShortenerApi::new();
    let store = CountingStore::new();
    api.script_code("abc1");

    let (manager, _events) = manager_with(&api, &store);
    manager.initialize().await;
    let toasts = manager.toasts();

    manager.create("https://a.example/").await.unwrap();
    assert_eq!(toasts.current().unwrap().message(), "Short link created");

    api.fail_all(true);
    let _ = manager.refresh_stats("abc1").await;
    assert_eq!(toasts.current().unwrap().message(), "Error fetching stats");
}
