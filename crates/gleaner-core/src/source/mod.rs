//! Change source abstraction.
//!
//! The harvester treats the search index (recordings) and the relational
//! store (collections) as the same kind of collaborator: an ordered,
//! count-limited change feed with tombstones. Backing each real store is
//! the adapter owner's job; this crate only ships the contract and an
//! in-memory implementation.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use crate::change::RawChange;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// An ordered feed of entity changes.
#[async_trait]
pub trait ChangeSource: Send + Sync {
    /// Return up to `limit` changes with `modified_at >= since`, ascending
    /// by `modified_at`, including tombstones for deleted entities. When
    /// `until` is given, only changes with `modified_at <= until` are
    /// returned.
    ///
    /// Must be a pure read: repeated calls with the same arguments against
    /// an unchanged store yield the same result.
    async fn fetch_changes(
        &self,
        since: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Result<Vec<RawChange>>;
}
