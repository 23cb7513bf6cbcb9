use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

use crate::core::client::storage::{ObjectMetadata, StorageClient, StorageError};
use crate::core::config::settings::Settings;
use crate::core::config::DEFAULT_BUCKET_WAIT_TIMEOUT_SECS;
use crate::error::HelperResult;
use crate::setup::build_helper;
use crate::types::object::ObjectRef;
use crate::types::params::AWSS3ValidatedArgs;

/// User metadata attached to every uploaded object
pub const FILE_TYPE_METADATA_KEY: &str = "file-type";
pub const FILE_TYPE_METADATA_VALUE: &str = "i2c Chained File";

static SHARED_HELPER: OnceCell<StorageHelper> = OnceCell::const_new();

/// Simplified bucket and object operations on top of a [`StorageClient`].
///
/// Object keys are always `prefix + name`, see [`ObjectRef`]. Every operation reports its outcome
/// through the returned `Result`; failures are also logged here so callers do not have to.
#[derive(Clone)]
pub struct StorageHelper {
    client: Arc<dyn StorageClient>,
    bucket_wait_timeout: Duration,
}

impl StorageHelper {
    pub fn new(client: Arc<dyn StorageClient>) -> Self {
        Self { client, bucket_wait_timeout: Duration::from_secs(DEFAULT_BUCKET_WAIT_TIMEOUT_SECS) }
    }

    pub fn with_bucket_wait_timeout(mut self, timeout: Duration) -> Self {
        self.bucket_wait_timeout = timeout;
        self
    }

    /// Process wide helper built from the settings file on first use.
    ///
    /// Concurrent first callers share one initialization. Once built, `settings_path` is ignored.
    /// A failed initialization is not cached, the next call tries again.
    pub async fn shared(settings_path: impl AsRef<Path>) -> HelperResult<&'static StorageHelper> {
        let settings_path = settings_path.as_ref();
        SHARED_HELPER
            .get_or_try_init(|| async {
                let settings = Settings::load(settings_path)?;
                let args = AWSS3ValidatedArgs::from_settings(&settings)?;
                build_helper(&args).await
            })
            .await
    }

    /// Create `bucket` and block until the service reports it, or the wait timeout elapses.
    pub async fn create_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        info!(bucket = %bucket, "Creating bucket");
        self.client
            .create_bucket(bucket)
            .await
            .inspect_err(|e| error!(bucket = %bucket, error = %e, "Failed to create bucket"))?;

        self.client
            .wait_until_bucket_exists(bucket, self.bucket_wait_timeout)
            .await
            .inspect_err(|e| error!(bucket = %bucket, error = %e, "Bucket did not become visible"))?;

        info!(bucket = %bucket, "{} is ready", bucket);
        Ok(())
    }

    pub async fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
        let buckets = self.client.list_buckets().await.inspect_err(|e| error!(error = %e, "Failed to list buckets"))?;
        for bucket in &buckets {
            info!(bucket = %bucket, "Found bucket");
        }
        Ok(buckets)
    }

    /// Delete `bucket`, which must be empty.
    pub async fn delete_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        self.client
            .delete_bucket(bucket)
            .await
            .inspect_err(|e| error!(bucket = %bucket, error = %e, "Failed to delete bucket"))?;
        info!(bucket = %bucket, "Deleted bucket");
        Ok(())
    }

    /// Delete the object stored under the full `key` with a single entry batch request.
    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_objects(bucket, &[key.to_string()])
            .await
            .inspect_err(|e| error!(bucket = %bucket, key = %key, error = %e, "Failed to delete object"))?;
        info!(bucket = %bucket, key = %key, "Deleting Successful");
        Ok(())
    }

    /// Upload `source` under `prefix` followed by the file name of `source`.
    pub async fn upload_object(
        &self,
        bucket: &str,
        prefix: &str,
        source: impl AsRef<Path>,
    ) -> Result<ObjectRef, StorageError> {
        let source = source.as_ref();
        let name = source.file_name().and_then(|name| name.to_str()).ok_or_else(|| {
            StorageError::InvalidInput(format!("Source path has no usable file name: {}", source.display()))
        })?;
        self.upload_object_as(bucket, prefix, name, source).await
    }

    /// Upload `source` under `prefix + name`.
    ///
    /// The whole file is read into memory first. The object carries the `file-type` metadata entry.
    pub async fn upload_object_as(
        &self,
        bucket: &str,
        prefix: &str,
        name: &str,
        source: impl AsRef<Path>,
    ) -> Result<ObjectRef, StorageError> {
        let source = source.as_ref();
        let object = ObjectRef::new(bucket, prefix, name);

        let data = tokio::fs::read(source).await.map_err(|e| {
            error!(path = %source.display(), error = %e, "Failed to read upload source");
            StorageError::io(source, e)
        })?;

        let metadata = HashMap::from([(FILE_TYPE_METADATA_KEY.to_string(), FILE_TYPE_METADATA_VALUE.to_string())]);
        self.client
            .put_object(&object.bucket, &object.key, Bytes::from(data), metadata)
            .await
            .inspect_err(|e| error!(object = %object, error = %e, "Failed to upload object"))?;

        info!(
            object = %object,
            "File -> {} was uploaded successfully as {}",
            source.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
            name
        );
        Ok(object)
    }

    /// URL of `prefix + name`. The same inputs always give the same URL.
    pub async fn object_url(&self, bucket: &str, prefix: &str, name: &str) -> Result<String, StorageError> {
        let object = ObjectRef::new(bucket, prefix, name);
        let url = self
            .client
            .object_url(&object.bucket, &object.key)
            .await
            .inspect_err(|e| error!(object = %object, error = %e, "Failed to build object url"))?;
        info!(object = %object, "The URL for {} is {}", name, url);
        Ok(url)
    }

    /// Time limited read URL of `prefix + name`.
    pub async fn presigned_url(
        &self,
        bucket: &str,
        prefix: &str,
        name: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        let object = ObjectRef::new(bucket, prefix, name);
        self.client
            .presigned_url(&object.bucket, &object.key, expires_in)
            .await
            .inspect_err(|e| error!(object = %object, error = %e, "Failed to presign object url"))
    }

    /// Download `prefix + name` into `destination_dir/name` and return the absolute path written.
    ///
    /// The directory must already exist and `name` must be a relative path made of plain
    /// components, nested names get their parent directories created below `destination_dir`.
    /// Both are checked before the storage service is contacted.
    pub async fn download_object(
        &self,
        bucket: &str,
        prefix: &str,
        name: &str,
        destination_dir: impl AsRef<Path>,
    ) -> Result<PathBuf, StorageError> {
        let destination_dir = destination_dir.as_ref();
        let relative = local_file_name(name)?;
        let is_dir = tokio::fs::metadata(destination_dir).await.map(|m| m.is_dir()).unwrap_or(false);
        if !is_dir {
            warn!(path = %destination_dir.display(), "Invalid file storage directory");
            return Err(StorageError::InvalidInput(format!(
                "Destination is not an existing directory: {}",
                destination_dir.display()
            )));
        }

        let object = ObjectRef::new(bucket, prefix, name);
        let data = self
            .client
            .get_object(&object.bucket, &object.key)
            .await
            .inspect_err(|e| error!(object = %object, error = %e, "Failed to download object"))?;

        let target = destination_dir.join(relative);
        if let Some(parent) = target.parent().filter(|parent| *parent != destination_dir) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                error!(path = %parent.display(), error = %e, "Failed to create download directory");
                StorageError::io(parent, e)
            })?;
        }
        tokio::fs::write(&target, &data).await.map_err(|e| {
            error!(path = %target.display(), error = %e, "Failed to write downloaded object");
            StorageError::io(&target, e)
        })?;
        let absolute = tokio::fs::canonicalize(&target).await.map_err(|e| StorageError::io(&target, e))?;

        info!(
            object = %object,
            data_bytes = data.len(),
            "File {} is downloaded and stored successfully at {}",
            name,
            destination_dir.display()
        );
        Ok(absolute)
    }

    /// `false` when the object (or its bucket) does not exist; other failures are errors.
    pub async fn file_exists(&self, bucket: &str, prefix: &str, name: &str) -> Result<bool, StorageError> {
        let object = ObjectRef::new(bucket, prefix, name);
        Ok(self.client.head_object(&object.bucket, &object.key).await?.is_some())
    }

    /// `false` when the bucket does not exist; other failures are errors.
    pub async fn bucket_exists(&self, bucket: &str) -> Result<bool, StorageError> {
        self.client.bucket_exists(bucket).await
    }

    pub async fn object_metadata(&self, bucket: &str, prefix: &str, name: &str) -> Result<ObjectMetadata, StorageError> {
        let object = ObjectRef::new(bucket, prefix, name);
        self.client
            .head_object(&object.bucket, &object.key)
            .await?
            .ok_or_else(|| StorageError::NotFound { bucket: object.bucket.clone(), key: object.key.clone() })
    }
}

/// `name` as a path that stays below the download directory.
fn local_file_name(name: &str) -> Result<&Path, StorageError> {
    let path = Path::new(name);
    let plain = path.components().all(|component| matches!(component, Component::Normal(_)));
    if name.is_empty() || !plain {
        warn!(name = %name, "Object name is not a relative file path");
        return Err(StorageError::InvalidInput(format!("Object name must be a relative file path: {name}")));
    }
    Ok(path)
}
