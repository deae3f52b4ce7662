//! CLI command implementations.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use gleaner_core::Harvester;
use gleaner_fs::FileFeed;
use std::path::Path;
use std::sync::Arc;

/// Build a harvester over two file feeds.
fn open_harvester(recordings: &Path, collections: &Path, buffer_secs: i64) -> Result<Harvester> {
    let recordings = FileFeed::open(recordings).context("Failed to open recordings feed")?;
    let collections = FileFeed::open(collections).context("Failed to open collections feed")?;

    Ok(
        Harvester::new(Arc::new(recordings), Arc::new(collections))
            .with_buffer(Duration::seconds(buffer_secs)),
    )
}

/// Start the harvest server.
pub fn serve(
    recordings: &Path,
    collections: &Path,
    host: &str,
    port: u16,
    buffer_secs: i64,
) -> Result<()> {
    let harvester = open_harvester(recordings, collections, buffer_secs)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async { gleaner_server::serve(harvester, host, port).await })
}

/// Run a single harvest and print the response as pretty JSON.
pub fn harvest(
    recordings: &Path,
    collections: &Path,
    since_ms: i64,
    preferred_amount: usize,
    buffer_secs: i64,
) -> Result<()> {
    let since = DateTime::<Utc>::from_timestamp_millis(since_ms)
        .context("'since' is not a valid millisecond timestamp")?;
    let harvester = open_harvester(recordings, collections, buffer_secs)?;

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async { harvester.harvest(since, preferred_amount).await })?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
