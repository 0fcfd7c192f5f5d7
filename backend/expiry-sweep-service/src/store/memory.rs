use super::{ensure_batch_size, DocumentStore};
use crate::error::{Result, SweepError};
use crate::models::{ContentRecord, SweepPredicate};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// In-process document store for dry runs and tests.
///
/// Keeps a log of committed batch sizes so callers can inspect how a sweep
/// partitioned its deletes.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    records: RwLock<BTreeMap<String, ContentRecord>>,
    commits: RwLock<Vec<usize>>,
    fail_queries: AtomicBool,
    fail_commits: AtomicBool,
    commit_calls: AtomicUsize,
    /// 1-based commit call to reject; 0 disables
    fail_commit_at: AtomicUsize,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = ContentRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self {
            records: RwLock::new(map),
            ..Self::default()
        }
    }

    pub async fn insert(&self, record: ContentRecord) {
        self.records.write().await.insert(record.id.clone(), record);
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.records.read().await.contains_key(id)
    }

    pub async fn records(&self) -> Vec<ContentRecord> {
        self.records.read().await.values().cloned().collect()
    }

    /// Sizes of every batch committed so far, in commit order
    pub async fn committed_batches(&self) -> Vec<usize> {
        self.commits.read().await.clone()
    }

    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Reject only the `call`-th commit (1-based) issued to this store
    pub fn fail_commit_number(&self, call: usize) {
        self.fail_commit_at.store(call, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn query(&self, predicate: &SweepPredicate) -> Result<Vec<ContentRecord>> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(SweepError::Internal("query unavailable".to_string()));
        }

        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|record| predicate.matches(record))
            .cloned()
            .collect())
    }

    async fn commit_delete_batch(&self, ids: Vec<String>) -> Result<usize> {
        let call = self.commit_calls.fetch_add(1, Ordering::SeqCst) + 1;
        ensure_batch_size(ids.len())?;
        if self.fail_commits.load(Ordering::SeqCst)
            || self.fail_commit_at.load(Ordering::SeqCst) == call
        {
            return Err(SweepError::Internal("commit rejected".to_string()));
        }

        let mut records = self.records.write().await;
        let deleted = ids
            .iter()
            .filter(|id| records.remove(id.as_str()).is_some())
            .count();
        self.commits.write().await.push(ids.len());

        Ok(deleted)
    }
}
