use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Object storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Delete batch of {size} exceeds the store limit of {limit} operations")]
    BatchTooLarge { size: usize, limit: usize },

    #[error("Invalid blob reference: {0}")]
    InvalidBlobReference(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tokio_cron_scheduler::JobSchedulerError> for SweepError {
    fn from(err: tokio_cron_scheduler::JobSchedulerError) -> Self {
        SweepError::Scheduler(err.to_string())
    }
}

impl From<envy::Error> for SweepError {
    fn from(err: envy::Error) -> Self {
        SweepError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SweepError>;
