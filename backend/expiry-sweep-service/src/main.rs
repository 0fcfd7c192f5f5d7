//! Expiry Sweep Service - Main entry point
//!
//! # Modes
//! - `scheduler` (default): register both sweeps on their cron schedules and
//!   run until interrupted
//! - `once`: run each sweep a single time and exit (for an external CronJob)

use anyhow::Result;
use chrono::Utc;
use expiry_sweep_service::{
    Config, DocumentStore, ExpirySweep, ObjectStore, PgDocumentStore, S3ObjectStore,
    SweepScheduler,
};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Service run mode
#[derive(Debug, Clone, PartialEq)]
enum RunMode {
    Scheduler,
    Once,
}

impl RunMode {
    fn from_args() -> Self {
        let args: Vec<String> = env::args().collect();

        for i in 0..args.len() {
            if args[i] == "--mode" && i + 1 < args.len() {
                return match args[i + 1].as_str() {
                    "once" => RunMode::Once,
                    "scheduler" => RunMode::Scheduler,
                    other => {
                        warn!("Unknown mode '{}', using default 'scheduler'", other);
                        RunMode::Scheduler
                    }
                };
            }
        }

        RunMode::Scheduler
    }
}

fn init_tracing(log_format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "expiry_sweep_service=debug,sqlx=warn,info".into());

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log_format);

    let mode = RunMode::from_args();
    info!("Starting Expiry Sweep Service in {:?} mode", mode);
    info!(
        story_schedule = %config.story_sweep_schedule,
        direct_schedule = %config.direct_sweep_schedule,
        timezone = %config.sweep_timezone,
        bucket = %config.s3_bucket,
        "Configuration loaded"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {}", e);
            anyhow::anyhow!("Database connection error: {}", e)
        })?;
    info!("Database pool initialized");

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        error!("Migration failed: {}", e);
        e
    })?;
    info!("Migrations completed successfully");

    let store: Arc<dyn DocumentStore> = Arc::new(PgDocumentStore::new(pool));
    let blob_store: Arc<dyn ObjectStore> =
        Arc::new(S3ObjectStore::from_config(&config.storage()).await);
    info!("Object store client initialized");

    let sweep_config = config.sweep();
    let story_sweep = Arc::new(ExpirySweep::stories(
        store.clone(),
        blob_store,
        sweep_config.clone(),
    ));
    let direct_sweep = Arc::new(ExpirySweep::direct_snaps(store, sweep_config));

    match mode {
        RunMode::Once => {
            let now = Utc::now();
            let stories = story_sweep.run(now).await;
            let snaps = direct_sweep.run(now).await;
            info!(
                stories_deleted = stories.deleted,
                snaps_deleted = snaps.deleted,
                "Single sweep pass completed"
            );
            Ok(())
        }
        RunMode::Scheduler => {
            let mut scheduler = SweepScheduler::new(config.timezone()?).await?;
            scheduler
                .register(story_sweep, &config.story_sweep_schedule)
                .await?;
            scheduler
                .register(direct_sweep, &config.direct_sweep_schedule)
                .await?;
            scheduler.start().await?;

            tokio::signal::ctrl_c().await?;
            info!("Received shutdown signal");

            scheduler.shutdown().await?;
            info!("Shutting down Expiry Sweep Service");
            Ok(())
        }
    }
}
