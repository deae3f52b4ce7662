//! In-memory [`ChangeSource`] for tests and embedding.
//!
//! Changes live in a `Vec` behind a `std::sync::RwLock`, kept sorted by
//! modification time so queries are a filter and truncate.

use super::ChangeSource;
use crate::change::RawChange;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::RwLock;

/// In-memory change source.
pub struct MemorySource {
    changes: RwLock<Vec<RawChange>>,
}

impl MemorySource {
    /// An empty source.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            changes: RwLock::new(Vec::new()),
        }
    }

    /// A source pre-filled with the given changes, in any order.
    #[must_use]
    pub fn with_changes(changes: impl IntoIterator<Item = RawChange>) -> Self {
        let mut changes: Vec<RawChange> = changes.into_iter().collect();
        changes.sort_by_key(|change| change.modified_at);
        Self {
            changes: RwLock::new(changes),
        }
    }

    /// Record another change.
    pub fn push(&self, change: RawChange) {
        let mut changes = self.changes.write().unwrap();
        changes.push(change);
        changes.sort_by_key(|change| change.modified_at);
    }
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChangeSource for MemorySource {
    async fn fetch_changes(
        &self,
        since: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Result<Vec<RawChange>> {
        let changes = self.changes.read().unwrap();
        Ok(changes
            .iter()
            .filter(|change| change.modified_at >= since)
            .filter(|change| until.is_none_or(|u| change.modified_at <= u))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{CollectionRecord, RecordingRecord};
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn recording(id: &str, secs: i64) -> RawChange {
        RawChange::recording(
            id,
            ts(secs),
            RecordingRecord::default()
                .with_title(id)
                .with_created(ts(0)),
        )
    }

    #[tokio::test]
    async fn test_ascending_order() {
        let source = MemorySource::with_changes([
            recording("c", 30),
            recording("a", 10),
            recording("b", 20),
        ]);

        let changes = source.fetch_changes(ts(0), None, 10).await.unwrap();
        let ids: Vec<&str> = changes.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_since_is_inclusive() {
        let source = MemorySource::with_changes([recording("a", 10), recording("b", 20)]);

        let changes = source.fetch_changes(ts(20), None, 10).await.unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].id, "b");
    }

    #[tokio::test]
    async fn test_until_and_limit() {
        let source = MemorySource::with_changes([
            recording("a", 10),
            recording("b", 20),
            recording("c", 30),
            recording("d", 40),
        ]);

        let changes = source
            .fetch_changes(ts(0), Some(ts(30)), 2)
            .await
            .unwrap();
        let ids: Vec<&str> = changes.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn test_tombstones_included() {
        let source = MemorySource::new();
        source.push(RawChange::collection(
            "col-1",
            ts(10),
            CollectionRecord::default(),
        ));
        source.push(RawChange::collection_tombstone("col-2", ts(20)));

        let changes = source.fetch_changes(ts(0), None, 10).await.unwrap();
        assert_eq!(changes.len(), 2);
        assert!(changes[1].body.is_deleted());
    }
}
