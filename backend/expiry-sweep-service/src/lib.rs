//! Expiry Sweep Service - scheduled purges of ephemeral content
//!
//! Two sweeps share one implementation:
//! - story sweep: deletes expired stories, then their images from object storage
//! - direct snap sweep: deletes expired direct snaps that were already viewed
//!
//! Both talk to their collaborators through the [`store::DocumentStore`] and
//! [`blob::ObjectStore`] ports.

pub mod blob;
pub mod config;
pub mod error;
pub mod jobs;
pub mod metrics;
pub mod models;
pub mod store;

pub use blob::{blob_path_from_url, InMemoryObjectStore, ObjectStore, S3ObjectStore};
pub use config::{Config, StorageConfig, SweepConfig};
pub use error::{Result, SweepError};
pub use jobs::{ExpirySweep, SweepScheduler, SweepStats, DIRECT_SNAP_SWEEP, STORY_SWEEP};
pub use models::{ContentRecord, RecordKind, SweepPredicate};
pub use store::{DocumentStore, InMemoryDocumentStore, PgDocumentStore, MAX_BATCH_OPERATIONS};
