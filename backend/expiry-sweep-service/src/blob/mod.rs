//! Object store port, adapters and blob reference parsing

pub mod memory;
pub mod s3;

pub use memory::InMemoryObjectStore;
pub use s3::S3ObjectStore;

use crate::error::{Result, SweepError};
use async_trait::async_trait;

/// Marker that precedes the encoded object path in download URLs
pub const DEFAULT_URL_MARKER: &str = "/o/";

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Delete the object stored at `path` (store-relative, decoded)
    async fn delete_object(&self, path: &str) -> Result<()>;
}

/// Extract the store-relative object path from a download URL.
///
/// The path is the percent-encoded segment between `marker` and the start of
/// the query string:
///
/// ```text
/// https://host/v0/b/bucket/o/stories%2Fu1%2Fa.jpg?alt=media&token=...
///                          ^^^^^^^^^^^^^^^^^^^^^^^
///                          -> stories/u1/a.jpg
/// ```
pub fn blob_path_from_url(url: &str, marker: &str) -> Result<String> {
    let start = url
        .find(marker)
        .map(|idx| idx + marker.len())
        .ok_or_else(|| SweepError::InvalidBlobReference(format!("no '{}' in {}", marker, url)))?;

    let encoded = &url[start..];
    let encoded = encoded.split(['?', '#']).next().unwrap_or_default();
    if encoded.is_empty() {
        return Err(SweepError::InvalidBlobReference(format!(
            "empty object path in {}",
            url
        )));
    }

    let decoded = urlencoding::decode(encoded)
        .map_err(|e| SweepError::InvalidBlobReference(format!("{}: {}", url, e)))?;

    Ok(decoded.into_owned())
}
