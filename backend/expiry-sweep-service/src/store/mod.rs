//! Document store port and adapters
//!
//! The sweep only needs two things from the store: a finite snapshot of the
//! records matching a predicate, and atomic multi-record delete batches.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryDocumentStore;
pub use postgres::PgDocumentStore;

use crate::error::Result;
use crate::models::{ContentRecord, SweepPredicate};
use async_trait::async_trait;

/// Maximum number of operations accepted by one atomic delete batch
pub const MAX_BATCH_OPERATIONS: usize = 500;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch every record matching `predicate` as one snapshot.
    ///
    /// No pagination: callers assume the result fits in memory.
    async fn query(&self, predicate: &SweepPredicate) -> Result<Vec<ContentRecord>>;

    /// Atomically delete the given ids. Ids that no longer exist are ignored.
    ///
    /// Returns the number of records actually removed. Batches larger than
    /// [`MAX_BATCH_OPERATIONS`] are rejected.
    async fn commit_delete_batch(&self, ids: Vec<String>) -> Result<usize>;
}

pub(crate) fn ensure_batch_size(size: usize) -> Result<()> {
    if size > MAX_BATCH_OPERATIONS {
        return Err(crate::error::SweepError::BatchTooLarge {
            size,
            limit: MAX_BATCH_OPERATIONS,
        });
    }
    Ok(())
}
