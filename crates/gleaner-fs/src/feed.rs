//! NDJSON change feeds.
//!
//! One feed file per entity kind, one [`RawChange`] JSON object per line,
//! in any order. Every query re-reads the file, so the feed stays a pure
//! read and external edits are picked up without restarting.

use crate::error::{FsError, Result};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gleaner_core::{ChangeSource, RawChange};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A change feed backed by one NDJSON file.
#[derive(Debug, Clone)]
pub struct FileFeed {
    path: PathBuf,
}

impl FileFeed {
    /// Open a feed file.
    ///
    /// # Errors
    /// Returns [`FsError::FeedNotFound`] if the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(FsError::FeedNotFound(path));
        }
        Ok(Self { path })
    }

    /// The feed file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every change in the feed, ascending by modification time.
    ///
    /// # Errors
    /// Fails on IO errors and on malformed lines; a broken feed line is a
    /// query error, not a silently dropped change.
    pub fn read_all(&self) -> Result<Vec<RawChange>> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut changes = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let change: RawChange =
                serde_json::from_str(&line).map_err(|source| FsError::Malformed {
                    path: self.path.clone(),
                    line: index + 1,
                    source,
                })?;
            changes.push(change);
        }

        changes.sort_by_key(|change| change.modified_at);

        debug!(path = %self.path.display(), count = changes.len(), "Read change feed");

        Ok(changes)
    }
}

#[async_trait]
impl ChangeSource for FileFeed {
    async fn fetch_changes(
        &self,
        since: DateTime<Utc>,
        until: Option<DateTime<Utc>>,
        limit: usize,
    ) -> anyhow::Result<Vec<RawChange>> {
        let mut changes = self
            .read_all()
            .with_context(|| format!("reading change feed '{}'", self.path.display()))?;

        changes.retain(|change| {
            change.modified_at >= since && until.is_none_or(|u| change.modified_at <= u)
        });
        changes.truncate(limit);

        Ok(changes)
    }
}
