//! Cron host for the expiry sweeps
//!
//! Each sweep is registered as an independent cron job evaluated in the
//! configured timezone. Runs of the same sweep are not serialized: if a run
//! overlaps the next tick both proceed, which is safe because deletes of
//! already-deleted records and objects are no-ops or tolerated failures.

use super::ExpirySweep;
use crate::error::Result;
use chrono::Utc;
use chrono_tz::Tz;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;
use uuid::Uuid;

pub struct SweepScheduler {
    scheduler: JobScheduler,
    timezone: Tz,
}

impl SweepScheduler {
    pub async fn new(timezone: Tz) -> Result<Self> {
        let scheduler = JobScheduler::new().await?;
        Ok(Self {
            scheduler,
            timezone,
        })
    }

    /// Register `sweep` on a cron expression (seconds field included)
    pub async fn register(&self, sweep: Arc<ExpirySweep>, schedule: &str) -> Result<Uuid> {
        let job_sweep = sweep.clone();
        let job = Job::new_async_tz(schedule, self.timezone, move |_uuid, _lock| {
            let sweep = job_sweep.clone();
            Box::pin(async move {
                sweep.run(Utc::now()).await;
            })
        })?;

        let id = self.scheduler.add(job).await?;
        info!(
            job = sweep.name(),
            schedule = %schedule,
            timezone = %self.timezone,
            "Sweep scheduled"
        );
        Ok(id)
    }

    pub async fn start(&self) -> Result<()> {
        self.scheduler.start().await?;
        info!("Sweep scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.scheduler.shutdown().await?;
        info!("Sweep scheduler stopped");
        Ok(())
    }
}
