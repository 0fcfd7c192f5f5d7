use super::ObjectStore;
use crate::config::StorageConfig;
use crate::error::{Result, SweepError};
use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client;
use std::sync::Arc;
use tracing::debug;

/// Object store backed by an S3 (or S3-compatible) bucket
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Arc<Client>,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: Arc<Client>, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client from the default credential chain
    pub async fn from_config(config: &StorageConfig) -> Self {
        let mut aws_config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        // S3-compatible storage such as MinIO
        if let Some(endpoint) = &config.endpoint {
            aws_config_builder = aws_config_builder.endpoint_url(endpoint);
        }

        let aws_config = aws_config_builder.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
            .force_path_style(config.endpoint.is_some())
            .build();

        Self::new(Arc::new(Client::from_conf(s3_config)), config.bucket.clone())
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn delete_object(&self, path: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| SweepError::Storage(format!("delete {}: {}", path, e)))?;

        debug!(bucket = %self.bucket, key = %path, "Object deleted");
        Ok(())
    }
}
