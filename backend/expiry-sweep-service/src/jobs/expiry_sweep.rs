//! Expiry Sweep
//!
//! One parameterized job behind both scheduled sweeps:
//! - stories: expired stories, plus the images they point to
//! - direct snaps: expired direct snaps that were already viewed (no blobs)
//!
//! A run takes one snapshot of the matching records, deletes them in atomic
//! batches of at most [`MAX_BATCH_OPERATIONS`], then (stories only) deletes
//! each committed record's image, one object at a time.
//!
//! `run` never fails. Query and commit errors are logged and reported through
//! [`SweepStats::failed`]; per-blob errors are logged and counted.

use crate::blob::{blob_path_from_url, ObjectStore};
use crate::config::SweepConfig;
use crate::error::{Result, SweepError};
use crate::metrics;
use crate::models::{ContentRecord, SweepPredicate};
use crate::store::{DocumentStore, MAX_BATCH_OPERATIONS};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

pub const STORY_SWEEP: &str = "story_expiry";
pub const DIRECT_SNAP_SWEEP: &str = "direct_snap_expiry";

/// Builds the predicate for a run from the run's `now`
pub type PredicateFactory = fn(DateTime<Utc>) -> SweepPredicate;

/// Outcome of a single sweep run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepStats {
    /// Records in the snapshot
    pub matched: usize,
    /// Records the store reported as removed
    pub deleted: usize,
    pub batch_commits: usize,
    pub blobs_deleted: usize,
    pub blobs_failed: usize,
    /// Blob references that could not be parsed
    pub blobs_skipped: usize,
    /// A query or commit error was caught during the run
    pub failed: bool,
}

pub struct ExpirySweep {
    name: &'static str,
    predicate: PredicateFactory,
    store: Arc<dyn DocumentStore>,
    /// Present only when the sweep also deletes attached blobs
    blob_store: Option<Arc<dyn ObjectStore>>,
    config: SweepConfig,
}

impl ExpirySweep {
    pub fn new(
        name: &'static str,
        predicate: PredicateFactory,
        store: Arc<dyn DocumentStore>,
        blob_store: Option<Arc<dyn ObjectStore>>,
        config: SweepConfig,
    ) -> Self {
        Self {
            name,
            predicate,
            store,
            blob_store,
            config,
        }
    }

    /// Expired stories and their images
    pub fn stories(
        store: Arc<dyn DocumentStore>,
        blob_store: Arc<dyn ObjectStore>,
        config: SweepConfig,
    ) -> Self {
        Self::new(
            STORY_SWEEP,
            SweepPredicate::stories,
            store,
            Some(blob_store),
            config,
        )
    }

    /// Expired, viewed direct snaps. Images are left alone.
    pub fn direct_snaps(store: Arc<dyn DocumentStore>, config: SweepConfig) -> Self {
        Self::new(
            DIRECT_SNAP_SWEEP,
            SweepPredicate::viewed_direct,
            store,
            None,
            config,
        )
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn cleans_up_blobs(&self) -> bool {
        self.blob_store.is_some()
    }

    /// Run one sweep pass against the records eligible at `now`.
    pub async fn run(&self, now: DateTime<Utc>) -> SweepStats {
        let correlation_id = Uuid::new_v4();
        let span = info_span!("expiry_sweep", job = self.name, correlation_id = %correlation_id);

        async move {
            let start = Instant::now();
            let mut stats = SweepStats::default();

            info!(now = %now, "Starting expiry sweep");

            match self.sweep(now, &mut stats).await {
                Ok(()) => {
                    metrics::record_run(self.name, "success");
                    info!(
                        matched = stats.matched,
                        deleted = stats.deleted,
                        batch_commits = stats.batch_commits,
                        blobs_deleted = stats.blobs_deleted,
                        blobs_failed = stats.blobs_failed,
                        blobs_skipped = stats.blobs_skipped,
                        duration_ms = start.elapsed().as_millis(),
                        "Expiry sweep completed"
                    );
                }
                Err(e) => {
                    stats.failed = true;
                    metrics::record_run(self.name, "error");
                    error!(
                        error = %e,
                        matched = stats.matched,
                        deleted = stats.deleted,
                        duration_ms = start.elapsed().as_millis(),
                        "Expiry sweep failed"
                    );
                }
            }

            metrics::record_duration(self.name, start.elapsed());
            stats
        }
        .instrument(span)
        .await
    }

    async fn sweep(&self, now: DateTime<Utc>, stats: &mut SweepStats) -> Result<()> {
        let predicate = (self.predicate)(now);
        let records = self.store.query(&predicate).await?;
        stats.matched = records.len();

        if records.is_empty() {
            debug!("No expired records");
            return Ok(());
        }

        let (committed, commit_error) = self.delete_records(&records, stats).await;

        if let Some(blob_store) = &self.blob_store {
            // Records in committed batches are gone either way; their images
            // are cleaned up even if another batch failed.
            if !committed.is_empty() {
                self.delete_blobs(blob_store.as_ref(), &committed, stats).await;
            }
        }

        match commit_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Partition `records` into delete batches and commit them.
    ///
    /// A batch is sealed whenever the running deletion count reaches a
    /// multiple of the batch size; the trailing partial batch is committed
    /// only if it is non-empty. Sealed batches are queued and all commits are
    /// joined before returning.
    async fn delete_records<'a>(
        &self,
        records: &'a [ContentRecord],
        stats: &mut SweepStats,
    ) -> (Vec<&'a ContentRecord>, Option<SweepError>) {
        let batch_size = self.config.batch_size.clamp(1, MAX_BATCH_OPERATIONS);

        let mut pending = Vec::with_capacity(records.len().div_ceil(batch_size));
        let mut batch = Vec::with_capacity(batch_size);
        let mut deleted_count = 0usize;

        for record in records {
            batch.push(record);
            deleted_count += 1;

            if deleted_count % batch_size == 0 {
                let sealed = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
                pending.push(self.commit_batch(sealed));
            }
        }

        if !batch.is_empty() {
            pending.push(self.commit_batch(batch));
        }

        let mut committed = Vec::with_capacity(records.len());
        let mut first_error = None;

        for (batch, result) in join_all(pending).await {
            match result {
                Ok(removed) => {
                    stats.batch_commits += 1;
                    stats.deleted += removed;
                    metrics::record_batch_commit(self.name);
                    metrics::record_records_deleted(self.name, removed as u64);
                    committed.extend(batch);
                }
                Err(e) => {
                    error!(batch_size = batch.len(), error = %e, "Delete batch commit failed");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        (committed, first_error)
    }

    async fn commit_batch<'a>(
        &self,
        batch: Vec<&'a ContentRecord>,
    ) -> (Vec<&'a ContentRecord>, Result<usize>) {
        let ids = batch.iter().map(|record| record.id.clone()).collect();
        let result = self.store.commit_delete_batch(ids).await;
        (batch, result)
    }

    /// Delete the image of every committed record, sequentially.
    async fn delete_blobs(
        &self,
        blob_store: &dyn ObjectStore,
        committed: &[&ContentRecord],
        stats: &mut SweepStats,
    ) {
        for record in committed {
            let Some(url) = record.blob_reference() else {
                continue;
            };

            let path = match blob_path_from_url(url, &self.config.blob_url_marker) {
                Ok(path) => path,
                Err(e) => {
                    stats.blobs_skipped += 1;
                    metrics::record_blob_deletion(self.name, "skipped");
                    warn!(record_id = %record.id, error = %e, "Skipping malformed image reference");
                    continue;
                }
            };

            match blob_store.delete_object(&path).await {
                Ok(()) => {
                    stats.blobs_deleted += 1;
                    metrics::record_blob_deletion(self.name, "deleted");
                    debug!(record_id = %record.id, path = %path, "Deleted image");
                }
                Err(e) => {
                    stats.blobs_failed += 1;
                    metrics::record_blob_deletion(self.name, "failed");
                    error!(record_id = %record.id, path = %path, error = %e, "Failed to delete image");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blob::InMemoryObjectStore;
    use crate::store::InMemoryDocumentStore;
    use chrono::Duration;

    fn expired_stories(count: usize, now: DateTime<Utc>) -> Vec<ContentRecord> {
        (0..count)
            .map(|i| ContentRecord::story(format!("story-{i:05}"), now - Duration::minutes(1)))
            .collect()
    }

    async fn commits_for(count: usize) -> Vec<usize> {
        let now = Utc::now();
        let store = Arc::new(InMemoryDocumentStore::with_records(expired_stories(count, now)));
        let sweep = ExpirySweep::new(
            STORY_SWEEP,
            SweepPredicate::stories,
            store.clone(),
            None,
            SweepConfig::default(),
        );

        let stats = sweep.run(now).await;
        assert_eq!(stats.deleted, count);
        assert_eq!(store.len().await, 0);
        store.committed_batches().await
    }

    #[tokio::test]
    async fn test_commit_count_is_ceil_of_batches() {
        assert_eq!(commits_for(0).await, Vec::<usize>::new());
        assert_eq!(commits_for(1).await, vec![1]);
        assert_eq!(commits_for(499).await, vec![499]);
        assert_eq!(commits_for(500).await, vec![500]);
        assert_eq!(commits_for(501).await, vec![500, 1]);
        assert_eq!(commits_for(1000).await, vec![500, 500]);
        assert_eq!(commits_for(1001).await, vec![500, 500, 1]);
    }

    #[tokio::test]
    async fn test_custom_batch_size() {
        let now = Utc::now();
        let store = Arc::new(InMemoryDocumentStore::with_records(expired_stories(7, now)));
        let blobs = Arc::new(InMemoryObjectStore::new());
        let config = SweepConfig {
            batch_size: 3,
            ..SweepConfig::default()
        };

        let stats = ExpirySweep::stories(store.clone(), blobs, config).run(now).await;

        assert_eq!(stats.batch_commits, 3);
        assert_eq!(store.committed_batches().await, vec![3, 3, 1]);
    }

    #[tokio::test]
    async fn test_failed_commit_marks_run_failed() {
        let now = Utc::now();
        let store = Arc::new(InMemoryDocumentStore::with_records(vec![
            ContentRecord::story("a", now - Duration::hours(1))
                .with_image_url("https://cdn/o/stories%2Fa.jpg?alt=media"),
        ]));
        store.fail_commits(true);
        let blobs = Arc::new(InMemoryObjectStore::with_objects(["stories/a.jpg"]));

        let stats = ExpirySweep::stories(store.clone(), blobs.clone(), SweepConfig::default())
            .run(now)
            .await;

        assert!(stats.failed);
        assert_eq!(stats.deleted, 0);
        assert_eq!(stats.blobs_deleted, 0);
        assert!(store.contains("a").await);
        assert!(blobs.contains("stories/a.jpg").await);
    }

    #[tokio::test]
    async fn test_partial_commit_failure_cleans_up_committed_batches_only() {
        let now = Utc::now();
        let records = (0..3)
            .map(|i| {
                ContentRecord::story(format!("s{i}"), now - Duration::hours(1))
                    .with_image_url(format!("https://cdn/o/p%2F{i}.jpg?alt=media"))
            })
            .collect::<Vec<_>>();
        let store = Arc::new(InMemoryDocumentStore::with_records(records));
        store.fail_commit_number(2);
        let blobs = Arc::new(InMemoryObjectStore::with_objects([
            "p/0.jpg", "p/1.jpg", "p/2.jpg",
        ]));
        let config = SweepConfig {
            batch_size: 1,
            ..SweepConfig::default()
        };

        let stats = ExpirySweep::stories(store.clone(), blobs.clone(), config)
            .run(now)
            .await;

        assert!(stats.failed);
        assert_eq!(stats.matched, 3);
        assert_eq!(stats.deleted, 2);
        assert_eq!(stats.batch_commits, 2);
        assert_eq!(stats.blobs_deleted, 2);
        assert_eq!(blobs.deleted_paths().await, vec!["p/0.jpg", "p/2.jpg"]);
        assert!(store.contains("s1").await);
        assert!(blobs.contains("p/1.jpg").await);
    }

    #[test]
    fn test_named_sweeps() {
        let store: Arc<dyn DocumentStore> = Arc::new(InMemoryDocumentStore::new());
        let blobs: Arc<dyn ObjectStore> = Arc::new(InMemoryObjectStore::new());

        let stories = ExpirySweep::stories(store.clone(), blobs, SweepConfig::default());
        let direct = ExpirySweep::direct_snaps(store, SweepConfig::default());

        assert_eq!(stories.name(), STORY_SWEEP);
        assert!(stories.cleans_up_blobs());
        assert_eq!(direct.name(), DIRECT_SNAP_SWEEP);
        assert!(!direct.cleans_up_blobs());
    }
}
