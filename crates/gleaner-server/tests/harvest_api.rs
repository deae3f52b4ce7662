//! End-to-end tests of the harvest endpoint against a real listener.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use gleaner_core::{
    ChangeSource, CollectionRecord, Harvester, MemorySource, RawChange, RecordingRecord,
};
use gleaner_server::router;
use std::sync::Arc;

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// Serve the app on an ephemeral port, returning its base URL.
async fn spawn_app(harvester: Harvester) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(harvester);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

fn seeded_harvester() -> Harvester {
    // Fixed instants well in the past, so nothing is clamped away.
    let recordings = MemorySource::with_changes([
        RawChange::recording(
            "rec-1",
            ts(1_600_000_100),
            RecordingRecord::default()
                .with_title("Lecture 1")
                .with_created(ts(1_600_000_000)),
        ),
        RawChange::recording_tombstone("rec-2", ts(1_600_000_300)),
    ]);
    let collections = MemorySource::with_changes([RawChange::collection(
        "col-1",
        ts(1_600_000_200),
        CollectionRecord::default().with_title("Algebra"),
    )]);

    Harvester::new(Arc::new(recordings), Arc::new(collections))
}

struct FailingSource;

#[async_trait]
impl ChangeSource for FailingSource {
    async fn fetch_changes(
        &self,
        _since: DateTime<Utc>,
        _until: Option<DateTime<Utc>>,
        _limit: usize,
    ) -> anyhow::Result<Vec<RawChange>> {
        Err(anyhow::anyhow!("index unavailable"))
    }
}

#[tokio::test]
async fn test_health() {
    let base = spawn_app(seeded_harvester()).await;

    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_harvest_happy_path() {
    let base = spawn_app(seeded_harvester()).await;

    let resp = reqwest::get(format!("{base}/harvest?preferredAmount=10&since=0"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["hasMore"], false);
    assert!(body["includesItemsUntil"].is_i64());

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);

    // Ascending by `updated`, tombstone last, timestamps in milliseconds.
    assert_eq!(items[0]["kind"], "event");
    assert_eq!(items[0]["id"], "rec-1");
    assert_eq!(items[0]["updated"], 1_600_000_100_000_i64);
    assert_eq!(items[1]["kind"], "series");
    assert_eq!(items[1]["id"], "col-1");
    assert_eq!(items[2]["kind"], "event-deleted");
    assert_eq!(items[2]["id"], "rec-2");
    assert!(items[2].get("title").is_none());
}

#[tokio::test]
async fn test_harvest_resumes_from_checkpoint() {
    let base = spawn_app(seeded_harvester()).await;

    let since_ms = 1_600_000_150_000_i64;
    let resp = reqwest::get(format!(
        "{base}/harvest?preferredAmount=10&since={since_ms}"
    ))
    .await
    .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], "col-1");
    assert_eq!(items[1]["id"], "rec-2");
}

#[tokio::test]
async fn test_missing_preferred_amount_rejected() {
    let base = spawn_app(seeded_harvester()).await;

    let resp = reqwest::get(format!("{base}/harvest?since=0")).await.unwrap();
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("preferredAmount")
    );
}

#[tokio::test]
async fn test_non_positive_preferred_amount_rejected() {
    let base = spawn_app(seeded_harvester()).await;

    for amount in ["0", "-3"] {
        let resp = reqwest::get(format!("{base}/harvest?preferredAmount={amount}&since=0"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }
}

#[tokio::test]
async fn test_missing_since_rejected() {
    let base = spawn_app(seeded_harvester()).await;

    let resp = reqwest::get(format!("{base}/harvest?preferredAmount=10"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("since"));
}

#[tokio::test]
async fn test_negative_since_rejected() {
    let base = spawn_app(seeded_harvester()).await;

    let resp = reqwest::get(format!("{base}/harvest?preferredAmount=10&since=-1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_source_failure_is_server_error() {
    let harvester = Harvester::new(Arc::new(FailingSource), Arc::new(MemorySource::new()));
    let base = spawn_app(harvester).await;

    let resp = reqwest::get(format!("{base}/harvest?preferredAmount=10&since=0"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);

    let body: serde_json::Value = resp.json().await.unwrap();
    // Backend detail is logged server-side, not echoed.
    assert_eq!(body["error"], "internal server error");
}
