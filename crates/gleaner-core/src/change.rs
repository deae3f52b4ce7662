//! Raw change records produced by the entity sources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which catalog entity a change belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// A recording (wire kind "event").
    Recording,
    /// A collection of recordings (wire kind "series").
    Collection,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Recording => write!(f, "recording"),
            Self::Collection => write!(f, "collection"),
        }
    }
}

/// A single media track attached to a recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Where the track can be fetched.
    pub uri: String,

    /// MIME type (e.g., "video/mp4").
    pub mimetype: String,

    /// Flavor tag distinguishing presenter/presentation/... variants.
    pub flavor: String,

    /// Width and height in pixels; absent for audio-only tracks.
    #[serde(default)]
    pub resolution: Option<[u32; 2]>,
}

/// Access rules of an entity, as role lists per action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acl {
    /// Roles allowed to read.
    #[serde(default)]
    pub read: Vec<String>,

    /// Roles allowed to write.
    #[serde(default)]
    pub write: Vec<String>,
}

/// Stored live payload of a recording change.
///
/// Every field is optional here: a stored document may be incomplete or
/// malformed, and normalization decides which omissions are fatal for the
/// record (see [`crate::item::normalize`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingRecord {
    /// Recording title.
    pub title: Option<String>,

    /// Identifier of the collection this recording belongs to.
    pub part_of: Option<String>,

    /// Free-form description.
    pub description: Option<String>,

    /// When the recording was created (distinct from when it was modified).
    pub created: Option<DateTime<Utc>>,

    /// Creator names from the recording's own metadata. May contain
    /// duplicates as stored.
    pub creators: Vec<String>,

    /// Duration in milliseconds, as stored. May be negative in malformed
    /// documents.
    pub duration_ms: Option<i64>,

    /// URL of a preview image.
    pub thumbnail: Option<String>,

    /// Playable tracks.
    pub tracks: Vec<Track>,

    /// Access rules.
    pub acl: Acl,
}

impl RecordingRecord {
    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the creation timestamp.
    #[must_use]
    pub const fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    /// Set the creator names.
    #[must_use]
    pub fn with_creators(mut self, creators: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.creators = creators.into_iter().map(Into::into).collect();
        self
    }

    /// Set the duration in milliseconds.
    #[must_use]
    pub const fn with_duration_ms(mut self, duration_ms: i64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Stored live payload of a collection change. Both fields are nullable on
/// the wire, so nothing here can fail normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionRecord {
    /// Collection title.
    pub title: Option<String>,

    /// Free-form description.
    pub description: Option<String>,
}

impl CollectionRecord {
    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Kind-specific content of a change. Tombstones carry no payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ChangeBody {
    /// A recording was created or modified.
    Recording(RecordingRecord),
    /// A recording was deleted.
    RecordingDeleted,
    /// A collection was created or modified.
    Collection(CollectionRecord),
    /// A collection was deleted.
    CollectionDeleted,
}

impl ChangeBody {
    /// The entity kind this body belongs to.
    #[must_use]
    pub const fn kind(&self) -> ChangeKind {
        match self {
            Self::Recording(_) | Self::RecordingDeleted => ChangeKind::Recording,
            Self::Collection(_) | Self::CollectionDeleted => ChangeKind::Collection,
        }
    }

    /// Whether this change is a tombstone.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        matches!(self, Self::RecordingDeleted | Self::CollectionDeleted)
    }
}

/// A single create/update/delete observed in one of the entity sources.
///
/// Read-only snapshot: sources materialize these per query and never hand
/// out shared mutable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawChange {
    /// Entity identifier, unique within its kind.
    pub id: String,

    /// When the entity was logically modified.
    pub modified_at: DateTime<Utc>,

    /// Kind-specific payload or tombstone.
    #[serde(flatten)]
    pub body: ChangeBody,
}

impl RawChange {
    /// A live recording change.
    #[must_use]
    pub fn recording(
        id: impl Into<String>,
        modified_at: DateTime<Utc>,
        record: RecordingRecord,
    ) -> Self {
        Self {
            id: id.into(),
            modified_at,
            body: ChangeBody::Recording(record),
        }
    }

    /// A recording tombstone.
    #[must_use]
    pub fn recording_tombstone(id: impl Into<String>, modified_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            modified_at,
            body: ChangeBody::RecordingDeleted,
        }
    }

    /// A live collection change.
    #[must_use]
    pub fn collection(
        id: impl Into<String>,
        modified_at: DateTime<Utc>,
        record: CollectionRecord,
    ) -> Self {
        Self {
            id: id.into(),
            modified_at,
            body: ChangeBody::Collection(record),
        }
    }

    /// A collection tombstone.
    #[must_use]
    pub fn collection_tombstone(id: impl Into<String>, modified_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            modified_at,
            body: ChangeBody::CollectionDeleted,
        }
    }

    /// The entity kind of this change.
    #[must_use]
    pub const fn kind(&self) -> ChangeKind {
        self.body.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_change_roundtrip() {
        let change = RawChange::recording(
            "rec-1",
            ts(1_000),
            RecordingRecord::default()
                .with_title("Lecture 1")
                .with_created(ts(900)),
        );

        let json = serde_json::to_string(&change).unwrap();
        assert!(json.contains(r#""kind":"recording""#));

        let parsed: RawChange = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, change);
    }

    #[test]
    fn test_tombstone_roundtrip() {
        let change = RawChange::collection_tombstone("col-9", ts(2_000));

        let json = serde_json::to_string(&change).unwrap();
        assert!(json.contains(r#""kind":"collection-deleted""#));

        let parsed: RawChange = serde_json::from_str(&json).unwrap();
        assert!(parsed.body.is_deleted());
        assert_eq!(parsed.kind(), ChangeKind::Collection);
    }

    #[test]
    fn test_sparse_recording_parses() {
        // Stored documents may omit most payload fields.
        let json = r#"{"id":"rec-2","modified_at":"2024-05-01T10:00:00Z","kind":"recording"}"#;
        let parsed: RawChange = serde_json::from_str(json).unwrap();

        match parsed.body {
            ChangeBody::Recording(record) => {
                assert_eq!(record.title, None);
                assert!(record.tracks.is_empty());
            }
            other => panic!("expected recording body, got {other:?}"),
        }
    }
}
