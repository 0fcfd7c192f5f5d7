//! Configuration for the expiry sweep service
use crate::blob::DEFAULT_URL_MARKER;
use crate::error::{Result, SweepError};
use crate::store::MAX_BATCH_OPERATIONS;
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::warn;

/// Main configuration struct, loaded from environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Bucket holding story images
    pub s3_bucket: String,

    #[serde(default = "default_aws_region")]
    pub aws_region: String,

    /// Custom endpoint for S3-compatible storage
    #[serde(default)]
    pub s3_endpoint: Option<String>,

    /// Marker preceding the encoded object path in image URLs
    #[serde(default = "default_blob_url_marker")]
    pub blob_url_marker: String,

    /// Cron expression (with seconds) for the story sweep
    #[serde(default = "default_story_schedule")]
    pub story_sweep_schedule: String,

    /// Cron expression (with seconds) for the direct snap sweep
    #[serde(default = "default_direct_schedule")]
    pub direct_sweep_schedule: String,

    /// IANA timezone the schedules are evaluated in
    #[serde(default = "default_timezone")]
    pub sweep_timezone: String,

    /// Records per delete batch, capped at the store limit
    #[serde(default = "default_batch_size")]
    pub sweep_batch_size: usize,

    /// `text` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_db_max_connections() -> u32 {
    5
}

fn default_aws_region() -> String {
    "us-east-1".to_string()
}

fn default_blob_url_marker() -> String {
    DEFAULT_URL_MARKER.to_string()
}

fn default_story_schedule() -> String {
    "0 0 * * * *".to_string() // hourly
}

fn default_direct_schedule() -> String {
    "0 0 0 * * *".to_string() // daily at midnight
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_batch_size() -> usize {
    MAX_BATCH_OPERATIONS
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sweep_batch_size == 0 {
            return Err(SweepError::Config(
                "SWEEP_BATCH_SIZE must be greater than zero".to_string(),
            ));
        }
        if self.blob_url_marker.is_empty() {
            return Err(SweepError::Config(
                "BLOB_URL_MARKER must not be empty".to_string(),
            ));
        }
        self.timezone()?;
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.sweep_timezone.parse::<Tz>().map_err(|e| {
            SweepError::Config(format!("invalid SWEEP_TIMEZONE '{}': {}", self.sweep_timezone, e))
        })
    }

    pub fn sweep(&self) -> SweepConfig {
        let batch_size = if self.sweep_batch_size > MAX_BATCH_OPERATIONS {
            warn!(
                requested = self.sweep_batch_size,
                limit = MAX_BATCH_OPERATIONS,
                "SWEEP_BATCH_SIZE exceeds the store limit, clamping"
            );
            MAX_BATCH_OPERATIONS
        } else {
            self.sweep_batch_size
        };

        SweepConfig {
            batch_size,
            blob_url_marker: self.blob_url_marker.clone(),
        }
    }

    pub fn storage(&self) -> StorageConfig {
        StorageConfig {
            bucket: self.s3_bucket.clone(),
            region: self.aws_region.clone(),
            endpoint: self.s3_endpoint.clone(),
        }
    }
}

/// Per-run sweep tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    pub batch_size: usize,
    pub blob_url_marker: String,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            batch_size: MAX_BATCH_OPERATIONS,
            blob_url_marker: DEFAULT_URL_MARKER.to_string(),
        }
    }
}

/// Object storage location
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        envy::from_iter(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
        .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = from_pairs(&[
            ("DATABASE_URL", "postgres://test"),
            ("S3_BUCKET", "media"),
        ]);

        assert!(config.validate().is_ok());
        assert_eq!(config.story_sweep_schedule, "0 0 * * * *");
        assert_eq!(config.direct_sweep_schedule, "0 0 0 * * *");
        assert_eq!(config.timezone().unwrap(), chrono_tz::UTC);
        assert_eq!(config.sweep(), SweepConfig::default());
        assert!(config.s3_endpoint.is_none());
    }

    #[test]
    fn test_batch_size_is_clamped_to_store_limit() {
        let config = from_pairs(&[
            ("DATABASE_URL", "postgres://test"),
            ("S3_BUCKET", "media"),
            ("SWEEP_BATCH_SIZE", "900"),
        ]);

        assert_eq!(config.sweep().batch_size, 500);
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let config = from_pairs(&[
            ("DATABASE_URL", "postgres://test"),
            ("S3_BUCKET", "media"),
            ("SWEEP_BATCH_SIZE", "0"),
        ]);

        assert!(matches!(config.validate(), Err(SweepError::Config(_))));
    }

    #[test]
    fn test_unknown_timezone_is_rejected() {
        let config = from_pairs(&[
            ("DATABASE_URL", "postgres://test"),
            ("S3_BUCKET", "media"),
            ("SWEEP_TIMEZONE", "Mars/Olympus_Mons"),
        ]);

        assert!(matches!(config.validate(), Err(SweepError::Config(_))));
    }

    #[test]
    fn test_named_timezone() {
        let config = from_pairs(&[
            ("DATABASE_URL", "postgres://test"),
            ("S3_BUCKET", "media"),
            ("SWEEP_TIMEZONE", "America/Los_Angeles"),
        ]);

        assert_eq!(config.timezone().unwrap(), chrono_tz::America::Los_Angeles);
    }
}
