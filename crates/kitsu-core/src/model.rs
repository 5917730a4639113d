// # Data Model
//
// `LinkRecord` is the unit of state: one short link as known to the remote
// service, plus the last locally fetched stat snapshot.
//
// `HistoryCollection` is the ordered, most-recent-first sequence of records
// with an explicit keyed upsert: inserting a record whose code already
// exists replaces the existing entry and moves it to the front, never
// duplicating it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single short link record
///
/// `short_code` is assigned by the remote service and is the primary key
/// within the collection. `created_at` is immutable after creation;
/// `long_url` and `updated_at` change via update; `access_count` is a stat
/// snapshot that goes stale between fetches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    /// Server-assigned identifier, unique across the collection
    pub short_code: String,

    /// Current validated target URL
    pub long_url: String,

    /// Set at creation, immutable
    pub created_at: DateTime<Utc>,

    /// Set on successful update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Last fetched access count, absent until the first stats fetch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_count: Option<u64>,
}

impl LinkRecord {
    /// Create a record as returned by a successful remote create call
    pub fn new(short_code: impl Into<String>, long_url: impl Into<String>) -> Self {
        Self {
            short_code: short_code.into(),
            long_url: long_url.into(),
            created_at: Utc::now(),
            updated_at: None,
            access_count: None,
        }
    }
}

/// Ordered collection of link records, most-recent-first
///
/// Invariant: `short_code` is unique across the collection at all times.
/// The keyed-upsert semantics replace the implicit filter-and-prepend dance
/// a presentation layer would otherwise do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryCollection {
    records: Vec<LinkRecord>,
}

impl HistoryCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from persisted records
    ///
    /// Order is preserved. Duplicate codes keep the first occurrence only
    /// (most-recent-first wins), so externally edited data cannot break the
    /// uniqueness invariant.
    pub fn from_records(records: Vec<LinkRecord>) -> Self {
        let mut collection = Self::new();
        for record in records {
            if collection.get(&record.short_code).is_none() {
                collection.records.push(record);
            }
        }
        collection
    }

    /// Insert a record at the front, replacing any entry with the same code
    ///
    /// Idempotent: upserting the same record twice leaves exactly one entry,
    /// positioned at the front.
    pub fn upsert_front(&mut self, record: LinkRecord) {
        self.records.retain(|r| r.short_code != record.short_code);
        self.records.insert(0, record);
    }

    /// Remove the record with the given code, if present
    pub fn remove(&mut self, short_code: &str) -> Option<LinkRecord> {
        let pos = self.records.iter().position(|r| r.short_code == short_code)?;
        Some(self.records.remove(pos))
    }

    /// Look up a record by code
    pub fn get(&self, short_code: &str) -> Option<&LinkRecord> {
        self.records.iter().find(|r| r.short_code == short_code)
    }

    /// Mutable lookup, preserving the record's position in the ordering
    pub fn get_mut(&mut self, short_code: &str) -> Option<&mut LinkRecord> {
        self.records.iter_mut().find(|r| r.short_code == short_code)
    }

    /// Iterate records in display order (most-recent-first)
    pub fn iter(&self) -> impl Iterator<Item = &LinkRecord> {
        self.records.iter()
    }

    /// The records in display order
    pub fn records(&self) -> &[LinkRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
