//! Integration Tests: Expiry Sweeps
//!
//! Runs both sweeps end to end against the in-memory store adapters.

use chrono::{DateTime, Duration, Utc};
use expiry_sweep_service::{
    ContentRecord, ExpirySweep, InMemoryDocumentStore, InMemoryObjectStore, SweepConfig,
};
use std::sync::Arc;

fn image_url(path: &str) -> String {
    format!(
        "https://firebasestorage.googleapis.com/v0/b/app.appspot.com/o/{}?alt=media&token=t",
        urlencoding::encode(path)
    )
}

fn story_with_image(id: &str, expires_at: DateTime<Utc>) -> ContentRecord {
    ContentRecord::story(id, expires_at).with_image_url(image_url(&format!("stories/{id}.jpg")))
}

fn story_sweep(
    store: &Arc<InMemoryDocumentStore>,
    blobs: &Arc<InMemoryObjectStore>,
) -> ExpirySweep {
    ExpirySweep::stories(store.clone(), blobs.clone(), SweepConfig::default())
}

#[tokio::test]
async fn test_story_sweep_deletes_expired_stories_and_images() {
    let now = Utc::now();
    let store = Arc::new(InMemoryDocumentStore::with_records(vec![
        story_with_image("old", now - Duration::hours(25)),
        story_with_image("live", now + Duration::hours(1)),
        ContentRecord::story("no-image", now - Duration::hours(2)),
        ContentRecord::direct("snap", now - Duration::hours(2), true),
    ]));
    let blobs = Arc::new(InMemoryObjectStore::with_objects([
        "stories/old.jpg",
        "stories/live.jpg",
    ]));

    let stats = story_sweep(&store, &blobs).run(now).await;

    assert!(!stats.failed);
    assert_eq!(stats.matched, 2);
    assert_eq!(stats.deleted, 2);
    assert_eq!(stats.batch_commits, 1);
    assert_eq!(stats.blobs_deleted, 1);

    assert!(!store.contains("old").await);
    assert!(!store.contains("no-image").await);
    assert!(store.contains("live").await);
    assert!(store.contains("snap").await);

    assert_eq!(blobs.deleted_paths().await, vec!["stories/old.jpg".to_string()]);
    assert!(blobs.contains("stories/live.jpg").await);
}

#[tokio::test]
async fn test_direct_sweep_only_removes_viewed_expired_snaps() {
    let now = Utc::now();
    let expired = now - Duration::days(2);
    let store = Arc::new(InMemoryDocumentStore::with_records(vec![
        ContentRecord::direct("seen", expired, true).with_image_url(image_url("snaps/seen.jpg")),
        ContentRecord::direct("unseen", expired, false),
        ContentRecord::direct("fresh", now + Duration::hours(3), true),
        ContentRecord::story("story", expired),
    ]));

    let stats = ExpirySweep::direct_snaps(store.clone(), SweepConfig::default())
        .run(now)
        .await;

    assert_eq!(stats.deleted, 1);
    assert_eq!(stats.blobs_deleted + stats.blobs_failed + stats.blobs_skipped, 0);
    assert!(!store.contains("seen").await);
    assert!(store.contains("unseen").await);
    assert!(store.contains("fresh").await);
    assert!(store.contains("story").await);
}

#[tokio::test]
async fn test_malformed_reference_does_not_stop_other_blobs() {
    let now = Utc::now();
    let expired = now - Duration::hours(1);
    let store = Arc::new(InMemoryDocumentStore::with_records(vec![
        story_with_image("a", expired),
        ContentRecord::story("b", expired).with_image_url("https://cdn.example.com/images/b.jpg"),
        story_with_image("c", expired),
    ]));
    let blobs = Arc::new(InMemoryObjectStore::with_objects([
        "stories/a.jpg",
        "stories/c.jpg",
    ]));

    let stats = story_sweep(&store, &blobs).run(now).await;

    assert!(!stats.failed);
    assert_eq!(stats.deleted, 3);
    assert_eq!(stats.blobs_skipped, 1);
    assert_eq!(stats.blobs_deleted, 2);
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn test_blob_failure_is_isolated() {
    let now = Utc::now();
    let expired = now - Duration::hours(1);
    let store = Arc::new(InMemoryDocumentStore::with_records(vec![
        story_with_image("a", expired),
        story_with_image("b", expired),
        story_with_image("c", expired),
    ]));
    let blobs = Arc::new(InMemoryObjectStore::with_objects([
        "stories/a.jpg",
        "stories/b.jpg",
        "stories/c.jpg",
    ]));
    blobs.fail_on("stories/b.jpg").await;

    let stats = story_sweep(&store, &blobs).run(now).await;

    assert!(!stats.failed);
    assert_eq!(stats.blobs_failed, 1);
    assert_eq!(stats.blobs_deleted, 2);
    assert!(blobs.contains("stories/b.jpg").await);
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn test_missing_object_counts_as_failure_only() {
    let now = Utc::now();
    let store = Arc::new(InMemoryDocumentStore::with_records(vec![story_with_image(
        "gone",
        now - Duration::hours(1),
    )]));
    let blobs = Arc::new(InMemoryObjectStore::new());

    let stats = story_sweep(&store, &blobs).run(now).await;

    assert!(!stats.failed);
    assert_eq!(stats.deleted, 1);
    assert_eq!(stats.blobs_failed, 1);
}

#[tokio::test]
async fn test_query_failure_is_swallowed() {
    let now = Utc::now();
    let store = Arc::new(InMemoryDocumentStore::with_records(vec![story_with_image(
        "a",
        now - Duration::hours(1),
    )]));
    store.fail_queries(true);
    let blobs = Arc::new(InMemoryObjectStore::with_objects(["stories/a.jpg"]));

    let stats = story_sweep(&store, &blobs).run(now).await;

    assert!(stats.failed);
    assert_eq!(stats.matched, 0);
    assert!(store.contains("a").await);
    assert!(store.committed_batches().await.is_empty());
}

#[tokio::test]
async fn test_exact_multiple_issues_no_empty_commit() {
    let now = Utc::now();
    let records = (0..1000).map(|i| story_with_image(&format!("s{i:04}"), now - Duration::minutes(5)));
    let store = Arc::new(InMemoryDocumentStore::with_records(records));
    let blobs = Arc::new(InMemoryObjectStore::new());

    let stats = story_sweep(&store, &blobs).run(now).await;

    assert_eq!(stats.batch_commits, 2);
    assert_eq!(store.committed_batches().await, vec![500, 500]);
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    let now = Utc::now();
    let store = Arc::new(InMemoryDocumentStore::with_records(
        (0..750).map(|i| story_with_image(&format!("s{i:04}"), now - Duration::minutes(5))),
    ));
    let blobs = Arc::new(InMemoryObjectStore::new());
    let sweep = story_sweep(&store, &blobs);

    let first = sweep.run(now).await;
    let second = sweep.run(now).await;

    assert_eq!(first.deleted, 750);
    assert_eq!(first.batch_commits, 2);
    assert_eq!(second.matched, 0);
    assert_eq!(second.deleted, 0);
    assert_eq!(second.batch_commits, 0);
    assert_eq!(store.committed_batches().await, vec![500, 250]);
}
