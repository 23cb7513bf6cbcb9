pub mod error;
pub mod memory;
pub mod s3;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
pub use error::StorageError;
use serde::Serialize;
use url::Url;

/// Characters escaped inside one path segment of an object URL
const PATH_SEGMENT: &AsciiSet =
    &CONTROLS.add(b' ').add(b'"').add(b'#').add(b'%').add(b'/').add(b'<').add(b'>').add(b'?').add(b'`').add(b'{').add(b'}');

/// Delay between two existence checks while waiting for a bucket
pub const BUCKET_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Object metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObjectMetadata {
    /// Object key
    pub key: String,

    /// Object size in bytes
    pub size: u64,

    /// Last modified timestamp
    pub last_modified: Option<chrono::DateTime<chrono::Utc>>,

    /// ETag
    pub etag: Option<String>,

    /// Content type
    pub content_type: Option<String>,

    /// User-defined metadata
    pub metadata: HashMap<String, String>,
}

/// Trait defining object storage operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Create a bucket. Returns as soon as the service accepted the request.
    async fn create_bucket(&self, bucket: &str) -> Result<(), StorageError>;

    /// Check if a bucket exists, a missing bucket is `Ok(false)`
    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StorageError>;

    /// Delete an empty bucket
    async fn delete_bucket(&self, bucket: &str) -> Result<(), StorageError>;

    /// Names of all buckets visible to the caller
    async fn list_buckets(&self) -> Result<Vec<String>, StorageError>;

    /// Store `data` under `key` with the given user metadata
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        metadata: HashMap<String, String>,
    ) -> Result<(), StorageError>;

    /// Get the full content of an object
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError>;

    /// Delete several objects in one batch request. Missing keys are not an error.
    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), StorageError>;

    /// Metadata of an object, `None` if it does not exist
    async fn head_object(&self, bucket: &str, key: &str) -> Result<Option<ObjectMetadata>, StorageError>;

    /// Plain (unsigned) URL of an object. The object is not required to exist.
    async fn object_url(&self, bucket: &str, key: &str) -> Result<String, StorageError>;

    /// Time limited URL granting read access to an object
    async fn presigned_url(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String, StorageError>;

    /// Poll [`StorageClient::bucket_exists`] until it reports the bucket or `timeout` elapses.
    async fn wait_until_bucket_exists(&self, bucket: &str, timeout: Duration) -> Result<(), StorageError> {
        let started = Instant::now();
        loop {
            if self.bucket_exists(bucket).await? {
                return Ok(());
            }
            let waited = started.elapsed();
            if waited >= timeout {
                return Err(StorageError::WaitTimeout { bucket: bucket.to_string(), waited });
            }
            tokio::time::sleep(BUCKET_POLL_INTERVAL.min(timeout - waited)).await;
        }
    }
}

/// Build the URL of `key` in `bucket`.
///
/// With `path_style` the bucket is the first path segment of `base`, otherwise it is
/// prepended to the host of `base`. Every `/` separated segment of the key is percent-encoded,
/// dot segments included, so the URL always addresses exactly `key`.
pub fn build_object_url(base: &Url, path_style: bool, bucket: &str, key: &str) -> Result<String, StorageError> {
    let mut url = base.clone();

    if !path_style {
        let host = base.host_str().ok_or_else(|| StorageError::InvalidInput(format!("URL without host: {base}")))?;
        url.set_host(Some(&format!("{bucket}.{host}")))
            .map_err(|e| StorageError::InvalidInput(format!("Invalid bucket name {bucket}: {e}")))?;
    }

    {
        let mut segments =
            url.path_segments_mut().map_err(|_| StorageError::InvalidInput(format!("URL cannot be a base: {base}")))?;
        segments.pop_if_empty();
        if path_style {
            segments.push(bucket);
        }
    }
    url.set_query(None);
    url.set_fragment(None);

    // Appended by hand, `Url` would resolve `.` and `..` segments of the key
    let mut object_url = url.as_str().trim_end_matches('/').to_string();
    for segment in key.split('/') {
        object_url.push('/');
        match segment {
            "." => object_url.push_str("%2E"),
            ".." => object_url.push_str("%2E%2E"),
            segment => object_url.extend(utf8_percent_encode(segment, PATH_SEGMENT)),
        }
    }

    Ok(object_url)
}
