use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio::sync::RwLock;
use url::Url;

use crate::core::client::storage::{build_object_url, ObjectMetadata, StorageClient, StorageError};

const IN_MEMORY_BASE_URL: &str = "http://in-memory.local";

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    metadata: HashMap<String, String>,
    last_modified: chrono::DateTime<Utc>,
}

/// Process local object storage with the error semantics of the S3 client.
///
/// Buckets become visible as soon as they are created, so waiting for a bucket never polls twice.
#[derive(Debug)]
pub struct InMemoryStorage {
    buckets: RwLock<BTreeMap<String, BTreeMap<String, StoredObject>>>,
    base_url: Url,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        let base_url = Url::parse(IN_MEMORY_BASE_URL).expect("in-memory base url is valid");
        Self { buckets: RwLock::new(BTreeMap::new()), base_url }
    }

    /// Number of objects currently stored in `bucket`, `None` if the bucket does not exist.
    pub async fn object_count(&self, bucket: &str) -> Option<usize> {
        self.buckets.read().await.get(bucket).map(BTreeMap::len)
    }
}

#[async_trait]
impl StorageClient for InMemoryStorage {
    async fn create_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        if bucket.is_empty() {
            return Err(StorageError::InvalidInput("bucket name must not be empty".to_string()));
        }
        let mut buckets = self.buckets.write().await;
        if buckets.contains_key(bucket) {
            return Err(StorageError::AlreadyExists(bucket.to_string()));
        }
        buckets.insert(bucket.to_string(), BTreeMap::new());
        Ok(())
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StorageError> {
        Ok(self.buckets.read().await.contains_key(bucket))
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        let mut buckets = self.buckets.write().await;
        match buckets.get(bucket) {
            None => Err(StorageError::BucketNotFound(bucket.to_string())),
            Some(objects) if !objects.is_empty() => Err(StorageError::BucketNotEmpty(bucket.to_string())),
            Some(_) => {
                buckets.remove(bucket);
                Ok(())
            }
        }
    }

    async fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.buckets.read().await.keys().cloned().collect())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        metadata: HashMap<String, String>,
    ) -> Result<(), StorageError> {
        let mut buckets = self.buckets.write().await;
        let objects = buckets.get_mut(bucket).ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))?;
        objects.insert(key.to_string(), StoredObject { data, metadata, last_modified: Utc::now() });
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        let buckets = self.buckets.read().await;
        let objects = buckets.get(bucket).ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))?;
        objects
            .get(key)
            .map(|object| object.data.clone())
            .ok_or_else(|| StorageError::NotFound { bucket: bucket.to_string(), key: key.to_string() })
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), StorageError> {
        let mut buckets = self.buckets.write().await;
        let objects = buckets.get_mut(bucket).ok_or_else(|| StorageError::BucketNotFound(bucket.to_string()))?;
        for key in keys {
            objects.remove(key);
        }
        Ok(())
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<Option<ObjectMetadata>, StorageError> {
        // S3 answers a HEAD on a missing bucket with a plain 404 as well
        let buckets = self.buckets.read().await;
        Ok(buckets.get(bucket).and_then(|objects| objects.get(key)).map(|object| ObjectMetadata {
            key: key.to_string(),
            size: object.data.len() as u64,
            last_modified: Some(object.last_modified),
            etag: None,
            content_type: None,
            metadata: object.metadata.clone(),
        }))
    }

    async fn object_url(&self, bucket: &str, key: &str) -> Result<String, StorageError> {
        build_object_url(&self.base_url, true, bucket, key)
    }

    async fn presigned_url(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String, StorageError> {
        if expires_in.is_zero() {
            return Err(StorageError::InvalidInput("presigned url expiry must be greater than zero".to_string()));
        }
        let url = build_object_url(&self.base_url, true, bucket, key)?;
        Ok(format!("{url}?X-Amz-Expires={}", expires_in.as_secs()))
    }
}
