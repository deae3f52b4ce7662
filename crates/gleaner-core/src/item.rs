//! Wire-ready harvest items.
//!
//! An [`Item`] is the normalized unit a consumer receives: one of four
//! kinds ("event", "event-deleted", "series", "series-deleted"), always
//! carrying the modification timestamp that drives response ordering.
//! Timestamps serialize as integer milliseconds since epoch.

use crate::change::{Acl, ChangeBody, RawChange, RecordingRecord, Track};
use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A live recording on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventItem {
    /// Recording identifier.
    pub id: String,

    /// Recording title. Required: records without one are skipped.
    pub title: String,

    /// Identifier of the containing collection, if any.
    #[serde(rename = "partOf")]
    pub part_of: Option<String>,

    /// Free-form description.
    pub description: Option<String>,

    /// Creation timestamp (ms since epoch).
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created: DateTime<Utc>,

    /// Creator names, de-duplicated, first occurrence wins.
    pub creators: Vec<String>,

    /// Duration in milliseconds, never negative.
    pub duration: i64,

    /// Preview image URL.
    pub thumbnail: Option<String>,

    /// Playable tracks.
    pub tracks: Vec<Track>,

    /// Access rules.
    pub acl: Acl,

    /// Modification timestamp (ms since epoch).
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated: DateTime<Utc>,
}

/// A live collection on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesItem {
    /// Collection identifier.
    pub id: String,

    /// Collection title.
    pub title: Option<String>,

    /// Free-form description.
    pub description: Option<String>,

    /// Modification timestamp (ms since epoch).
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated: DateTime<Utc>,
}

/// A tombstone on the wire: identity and deletion time, nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedItem {
    /// Entity identifier.
    pub id: String,

    /// Deletion timestamp (ms since epoch).
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated: DateTime<Utc>,
}

/// One entry of a harvest response.
///
/// Consumers must ignore unknown fields within each shape; new optional
/// fields may appear without a version bump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Item {
    /// A live recording.
    #[serde(rename = "event")]
    Event(EventItem),

    /// A deleted recording.
    #[serde(rename = "event-deleted")]
    EventDeleted(DeletedItem),

    /// A live collection.
    #[serde(rename = "series")]
    Series(SeriesItem),

    /// A deleted collection.
    #[serde(rename = "series-deleted")]
    SeriesDeleted(DeletedItem),
}

impl Item {
    /// The modification timestamp, present on every kind.
    #[must_use]
    pub const fn updated(&self) -> DateTime<Utc> {
        match self {
            Self::Event(item) => item.updated,
            Self::Series(item) => item.updated,
            Self::EventDeleted(item) | Self::SeriesDeleted(item) => item.updated,
        }
    }

    /// The entity identifier, present on every kind.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Event(item) => &item.id,
            Self::Series(item) => &item.id,
            Self::EventDeleted(item) | Self::SeriesDeleted(item) => &item.id,
        }
    }
}

/// Convert a raw change into its wire item.
///
/// # Errors
/// Returns an error for live recordings whose stored payload is unusable
/// (no title, or no creation date). Collection payloads and tombstones
/// always convert.
pub fn normalize(change: &RawChange) -> Result<Item> {
    let updated = change.modified_at;

    match &change.body {
        ChangeBody::Recording(record) => normalize_recording(&change.id, updated, record),
        ChangeBody::RecordingDeleted => Ok(Item::EventDeleted(DeletedItem {
            id: change.id.clone(),
            updated,
        })),
        ChangeBody::Collection(record) => Ok(Item::Series(SeriesItem {
            id: change.id.clone(),
            title: record.title.clone(),
            description: record.description.clone(),
            updated,
        })),
        ChangeBody::CollectionDeleted => Ok(Item::SeriesDeleted(DeletedItem {
            id: change.id.clone(),
            updated,
        })),
    }
}

fn normalize_recording(id: &str, updated: DateTime<Utc>, record: &RecordingRecord) -> Result<Item> {
    let title = record
        .title
        .clone()
        .ok_or_else(|| CoreError::MissingTitle(id.to_string()))?;
    let created = record
        .created
        .ok_or_else(|| CoreError::MissingCreated(id.to_string()))?;

    // De-duplicate creators, keeping the stored order.
    let mut creators: Vec<String> = Vec::with_capacity(record.creators.len());
    for creator in &record.creators {
        if !creators.contains(creator) {
            creators.push(creator.clone());
        }
    }

    Ok(Item::Event(EventItem {
        id: id.to_string(),
        title,
        part_of: record.part_of.clone(),
        description: record.description.clone(),
        created,
        creators,
        duration: record.duration_ms.unwrap_or(0).max(0),
        thumbnail: record.thumbnail.clone(),
        tracks: record.tracks.clone(),
        acl: record.acl.clone(),
        updated,
    }))
}
