//! Prometheus metrics for the expiry sweeps
//!
//! Registered in the default registry so the host process can export them.

use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec,
};
use std::time::Duration;

static SWEEP_RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "expiry_sweep_runs_total",
        "Total number of sweep runs (success/error)",
        &["job", "status"]
    )
    .expect("failed to register expiry_sweep_runs_total")
});

static SWEEP_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "expiry_sweep_duration_seconds",
        "Duration of sweep runs",
        &["job"],
        vec![0.01, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0]
    )
    .expect("failed to register expiry_sweep_duration_seconds")
});

static RECORDS_DELETED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "expiry_sweep_records_deleted_total",
        "Total records deleted by sweeps",
        &["job"]
    )
    .expect("failed to register expiry_sweep_records_deleted_total")
});

static BATCH_COMMITS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "expiry_sweep_batch_commits_total",
        "Total delete batches committed",
        &["job"]
    )
    .expect("failed to register expiry_sweep_batch_commits_total")
});

static BLOB_DELETIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "expiry_sweep_blob_deletions_total",
        "Blob deletions attempted by sweeps (deleted/failed/skipped)",
        &["job", "status"]
    )
    .expect("failed to register expiry_sweep_blob_deletions_total")
});

pub fn record_run(job: &str, status: &str) {
    SWEEP_RUNS_TOTAL.with_label_values(&[job, status]).inc();
}

pub fn record_duration(job: &str, duration: Duration) {
    SWEEP_DURATION_SECONDS
        .with_label_values(&[job])
        .observe(duration.as_secs_f64());
}

pub fn record_records_deleted(job: &str, count: u64) {
    RECORDS_DELETED_TOTAL.with_label_values(&[job]).inc_by(count);
}

pub fn record_batch_commit(job: &str) {
    BATCH_COMMITS_TOTAL.with_label_values(&[job]).inc();
}

pub fn record_blob_deletion(job: &str, status: &str) {
    BLOB_DELETIONS_TOTAL.with_label_values(&[job, status]).inc();
}
