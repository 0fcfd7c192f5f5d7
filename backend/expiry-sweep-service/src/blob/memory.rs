use super::ObjectStore;
use crate::error::{Result, SweepError};
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::RwLock;

/// In-process object store with per-path failure injection
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashSet<String>>,
    failing: RwLock<HashSet<String>>,
    deletions: RwLock<Vec<String>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_objects<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            objects: RwLock::new(paths.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Make every delete of `path` fail
    pub async fn fail_on(&self, path: impl Into<String>) {
        self.failing.write().await.insert(path.into());
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.objects.read().await.contains(path)
    }

    /// Paths passed to successful deletes, in call order
    pub async fn deleted_paths(&self) -> Vec<String> {
        self.deletions.read().await.clone()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn delete_object(&self, path: &str) -> Result<()> {
        if self.failing.read().await.contains(path) {
            return Err(SweepError::Storage(format!("delete {}: injected failure", path)));
        }

        if !self.objects.write().await.remove(path) {
            return Err(SweepError::Storage(format!("delete {}: object not found", path)));
        }

        self.deletions.write().await.push(path.to_string());
        Ok(())
    }
}
