use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::{Region, SdkConfig};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration, Delete, ObjectIdentifier};
use aws_sdk_s3::Client;
use bytes::Bytes;
use url::Url;

use crate::core::client::storage::error::classify_service_error;
use crate::core::client::storage::{build_object_url, ObjectMetadata, StorageClient, StorageError};
use crate::types::params::AWSS3ValidatedArgs;

/// Region in which buckets are created without a location constraint
const DEFAULT_REGION: &str = "us-east-1";

/// AWSS3 wraps the AWS S3 client together with the settings needed to address objects.
#[derive(Clone, Debug)]
pub struct AWSS3 {
    client: Arc<Client>,
    region: String,
    base_url: Url,
    path_style: bool,
}

impl AWSS3 {
    /// Creates a new instance of AWSS3 with the provided AWS configuration.
    /// # Arguments
    /// * `aws_config` - The AWS configuration.
    /// * `args` - Region, optional endpoint and addressing style.
    ///
    /// # Returns
    /// * `Result<Self, StorageError>` - `InvalidInput` if no base URL can be derived for the region.
    pub fn new(aws_config: &SdkConfig, args: &AWSS3ValidatedArgs) -> Result<Self, StorageError> {
        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(aws_config);
        s3_config_builder = s3_config_builder.region(Region::new(args.region.clone()));
        // path style is necessary for it to work with localstack and minio
        s3_config_builder = s3_config_builder.force_path_style(args.force_path_style);
        if let Some(endpoint) = &args.endpoint {
            s3_config_builder = s3_config_builder.endpoint_url(endpoint.as_str());
        }
        let client = Client::from_conf(s3_config_builder.build());

        let base_url = match &args.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => Url::parse(&format!("https://s3.{}.amazonaws.com", args.region))
                .map_err(|e| StorageError::InvalidInput(format!("Invalid region {}: {e}", args.region)))?,
        };

        Ok(Self { client: Arc::new(client), region: args.region.clone(), base_url, path_style: args.force_path_style })
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

/// Translate an SDK error into a [`StorageError`], keeping the service reported message.
fn classify<E>(err: SdkError<E>, bucket: &str, key: Option<&str>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            return StorageError::Transient(DisplayErrorContext(&err).to_string());
        }
        SdkError::ConstructionFailure(_) => {
            return StorageError::InvalidInput(DisplayErrorContext(&err).to_string());
        }
        _ => {}
    }

    let status = err.raw_response().map(|response| response.status().as_u16());
    let message = err.message().map(str::to_string).unwrap_or_else(|| DisplayErrorContext(&err).to_string());
    classify_service_error(err.code(), status, message, bucket, key)
}

#[async_trait]
impl StorageClient for AWSS3 {
    async fn create_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        let mut request = self.client.create_bucket().bucket(bucket);

        if self.region != DEFAULT_REGION {
            let constraint = BucketLocationConstraint::from(self.region.as_str());
            let configuration = CreateBucketConfiguration::builder().location_constraint(constraint).build();
            request = request.create_bucket_configuration(configuration);
        }

        request.send().await.map_err(|e| classify(e, bucket, None))?;

        tracing::debug!(
            log_type = "Storage",
            category = "storage_call",
            region = %self.region,
            "Bucket creation requested for {}",
            bucket
        );
        Ok(())
    }

    async fn bucket_exists(&self, bucket: &str) -> Result<bool, StorageError> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) => match err.as_service_error() {
                Some(service_err) if service_err.is_not_found() => Ok(false),
                _ => Err(classify(err, bucket, None)),
            },
        }
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<(), StorageError> {
        self.client.delete_bucket().bucket(bucket).send().await.map_err(|e| classify(e, bucket, None))?;
        Ok(())
    }

    async fn list_buckets(&self) -> Result<Vec<String>, StorageError> {
        let output = self.client.list_buckets().send().await.map_err(|e| classify(e, "", None))?;
        Ok(output.buckets().iter().filter_map(|bucket| bucket.name().map(str::to_string)).collect())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        metadata: HashMap<String, String>,
    ) -> Result<(), StorageError> {
        let size = data.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .set_metadata(Some(metadata))
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| classify(e, bucket, Some(key)))?;

        tracing::debug!(
            log_type = "Storage",
            category = "storage_call",
            data_bytes = size,
            "Successfully put data into {}. key={}",
            bucket,
            key
        );
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        let output =
            self.client.get_object().bucket(bucket).key(key).send().await.map_err(|e| classify(e, bucket, Some(key)))?;

        let data = output.body.collect().await.map_err(|e| StorageError::Transient(e.to_string()))?;
        let data_bytes = data.into_bytes();

        tracing::debug!(
            log_type = "Storage",
            category = "storage_call",
            data_bytes = data_bytes.len(),
            "Successfully retrieved data from {}, key={}",
            bucket,
            key
        );
        Ok(data_bytes)
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), StorageError> {
        let identifiers = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::InvalidInput(e.to_string()))?;
        let delete =
            Delete::builder().set_objects(Some(identifiers)).build().map_err(|e| StorageError::InvalidInput(e.to_string()))?;

        let output = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| classify(e, bucket, None))?;

        // A batch request succeeds as a whole even when single keys fail
        if let Some(failed) = output.errors().first() {
            let message = failed.message().unwrap_or("object could not be deleted").to_string();
            return Err(classify_service_error(failed.code(), None, message, bucket, failed.key()));
        }
        Ok(())
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<Option<ObjectMetadata>, StorageError> {
        let output = match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(output) => output,
            Err(err) => {
                return match err.as_service_error() {
                    Some(service_err) if service_err.is_not_found() => Ok(None),
                    _ => Err(classify(err, bucket, Some(key))),
                };
            }
        };

        let last_modified = output
            .last_modified()
            .and_then(|modified| chrono::DateTime::<chrono::Utc>::from_timestamp(modified.secs(), modified.subsec_nanos()));

        Ok(Some(ObjectMetadata {
            key: key.to_string(),
            size: output.content_length().and_then(|len| u64::try_from(len).ok()).unwrap_or_default(),
            last_modified,
            etag: output.e_tag().map(str::to_string),
            content_type: output.content_type().map(str::to_string),
            metadata: output.metadata().cloned().unwrap_or_default(),
        }))
    }

    async fn object_url(&self, bucket: &str, key: &str) -> Result<String, StorageError> {
        build_object_url(&self.base_url, self.path_style, bucket, key)
    }

    async fn presigned_url(&self, bucket: &str, key: &str, expires_in: Duration) -> Result<String, StorageError> {
        let config = PresigningConfig::expires_in(expires_in).map_err(|e| StorageError::InvalidInput(e.to_string()))?;
        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(config)
            .await
            .map_err(|e| classify(e, bucket, Some(key)))?;
        Ok(request.uri().to_string())
    }
}
