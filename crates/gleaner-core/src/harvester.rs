//! The harvest merge and watermark computation.
//!
//! A harvest is a pure function of the checkpoint, the batch size target,
//! the current source contents and the current time: both sources are
//! queried, their results merged into one stream, and a watermark is
//! computed from which the consumer can safely resume without losing any
//! change. Nothing is cached or persisted here; all protocol state lives
//! in the consumer's checkpoint.

use crate::change::ChangeKind;
use crate::clock::{Clock, SystemClock};
use crate::error::{CoreError, Result};
use crate::item::{Item, normalize};
use crate::source::ChangeSource;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Default watermark safety buffer, in seconds.
///
/// A record's modification timestamp is written before the record becomes
/// visible to the sources, so the watermark must never claim completeness
/// for the most recent past. Size this to the write-visibility latency of
/// the deployed stores.
pub const DEFAULT_BUFFER_SECS: i64 = 180;

/// The response envelope of one harvest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestResult {
    /// Every change up to and including this instant has been delivered,
    /// across this call and its predecessors (ms since epoch on the wire).
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub includes_items_until: DateTime<Utc>,

    /// Whether another harvest from the returned watermark would yield
    /// further already-known changes.
    pub has_more: bool,

    /// Normalized changes, ascending by `updated`.
    pub items: Vec<Item>,
}

/// Merges the recording and collection sources into one resumable stream.
#[derive(Clone)]
pub struct Harvester {
    recordings: Arc<dyn ChangeSource>,
    collections: Arc<dyn ChangeSource>,
    clock: Arc<dyn Clock>,
    buffer: Duration,
}

impl Harvester {
    /// A harvester over the given sources, with the system clock and the
    /// default buffer.
    #[must_use]
    pub fn new(recordings: Arc<dyn ChangeSource>, collections: Arc<dyn ChangeSource>) -> Self {
        Self {
            recordings,
            collections,
            clock: Arc::new(SystemClock),
            buffer: Duration::seconds(DEFAULT_BUFFER_SECS),
        }
    }

    /// Replace the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the watermark safety buffer.
    #[must_use]
    pub fn with_buffer(mut self, buffer: Duration) -> Self {
        self.buffer = buffer;
        self
    }

    /// Harvest every change with `modified_at >= since`, up to roughly
    /// `preferred_amount` per kind.
    ///
    /// `preferred_amount` is a soft target: the response may contain up to
    /// twice as many items (both kinds contribute), or fewer when changes
    /// are sparse or individual records fail to normalize.
    ///
    /// # Errors
    /// Fails when `preferred_amount` is zero or when either source query
    /// fails. Per-record normalization failures do not fail the harvest;
    /// the offending record is skipped and logged, and its raw fetch slot
    /// still counts towards `has_more` and the watermark.
    pub async fn harvest(
        &self,
        since: DateTime<Utc>,
        preferred_amount: usize,
    ) -> Result<HarvestResult> {
        if preferred_amount == 0 {
            return Err(CoreError::InvalidAmount);
        }

        // Over-fetch by one: the extra element is never returned, it only
        // tells us whether more recordings exist and where the boundary of
        // this batch lies.
        let limit = preferred_amount + 1;
        let raw_recordings = self
            .recordings
            .fetch_changes(since, None, limit)
            .await
            .map_err(|source| CoreError::Source {
                kind: ChangeKind::Recording,
                source,
            })?;
        let has_more_recordings = raw_recordings.len() == limit;

        // Bound the collection fetch by the recordings boundary. Any
        // collection modified after it is picked up once the consumer's
        // checkpoint advances past the boundary, instead of being sent
        // twice across consecutive requests.
        let collections_until =
            has_more_recordings.then(|| raw_recordings[preferred_amount].modified_at);
        let raw_collections = self
            .collections
            .fetch_changes(since, collections_until, limit)
            .await
            .map_err(|source| CoreError::Source {
                kind: ChangeKind::Collection,
                source,
            })?;
        let has_more_collections = raw_collections.len() == limit;

        let recordings = &raw_recordings[..raw_recordings.len().min(preferred_amount)];
        let collections = &raw_collections[..raw_collections.len().min(preferred_amount)];

        // If the collection fetch was itself truncated, recordings past the
        // last returned collection must wait: the next request re-delivers
        // them together with the remaining collections.
        let collection_cutoff = if has_more_collections {
            collections.last().map(|change| change.modified_at)
        } else {
            None
        };
        let recordings = recordings.iter().filter(|change| {
            collection_cutoff.is_none_or(|cutoff| change.modified_at <= cutoff)
        });

        let mut items: Vec<Item> = recordings
            .chain(collections.iter())
            .filter_map(|change| match normalize(change) {
                Ok(item) => Some(item),
                Err(error) => {
                    warn!(
                        kind = %change.kind(),
                        id = %change.id,
                        %error,
                        "skipping change that failed to normalize"
                    );
                    None
                }
            })
            .collect();
        items.sort_by_key(Item::updated);

        let has_more = has_more_recordings || has_more_collections;
        let now = self.clock.now();

        let raw_watermark = match (has_more_recordings, has_more_collections) {
            // Everything currently known has been returned.
            (false, false) => now,
            // The collection boundary is the tighter bound: when recordings
            // were truncated too, the `until` cap keeps every fetched
            // collection at or below the recording boundary.
            (_, true) => raw_collections[preferred_amount].modified_at,
            (true, false) => raw_recordings[preferred_amount].modified_at,
        };

        // Never claim completeness for the most recent past: writes whose
        // timestamps predate their visibility must have time to land.
        let includes_items_until = raw_watermark.min(now - self.buffer);

        Ok(HarvestResult {
            includes_items_until,
            has_more,
            items,
        })
    }
}
