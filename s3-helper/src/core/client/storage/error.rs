use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Object {key} not found in bucket {bucket}")]
    NotFound { bucket: String, key: String },

    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    #[error("Bucket already exists: {0}")]
    AlreadyExists(String),

    #[error("Bucket is not empty: {0}")]
    BucketNotEmpty(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Timeouts, connection failures and throttling. Safe to retry.
    #[error("Transient storage failure: {0}")]
    Transient(String),

    #[error("Bucket {bucket} was not visible after {waited:?}")]
    WaitTimeout { bucket: String, waited: Duration },

    #[error("Storage service error {code}: {message}")]
    Service { code: String, message: String },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    /// `true` for both missing objects and missing buckets.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. } | StorageError::BucketNotFound(_))
    }

    /// `true` when retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Transient(_) | StorageError::WaitTimeout { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io { path: path.into(), source }
    }
}

/// Map an S3 style error code and HTTP status to a [`StorageError`].
///
/// Codes take precedence over the status. `key` is `None` for bucket level calls,
/// which turns a bare 404 into [`StorageError::BucketNotFound`].
pub fn classify_service_error(
    code: Option<&str>,
    status: Option<u16>,
    message: String,
    bucket: &str,
    key: Option<&str>,
) -> StorageError {
    let not_found = || match key {
        Some(key) => StorageError::NotFound { bucket: bucket.to_string(), key: key.to_string() },
        None => StorageError::BucketNotFound(bucket.to_string()),
    };

    match (code, status) {
        (Some("NoSuchKey"), _) => not_found(),
        (Some("NoSuchBucket"), _) => StorageError::BucketNotFound(bucket.to_string()),
        (Some("BucketAlreadyExists" | "BucketAlreadyOwnedByYou"), _) => StorageError::AlreadyExists(bucket.to_string()),
        (Some("BucketNotEmpty"), _) => StorageError::BucketNotEmpty(bucket.to_string()),
        (Some("AccessDenied" | "Forbidden" | "InvalidAccessKeyId" | "SignatureDoesNotMatch"), _) => {
            StorageError::PermissionDenied(message)
        }
        (Some("InvalidBucketName" | "KeyTooLongError" | "InvalidArgument"), _) => StorageError::InvalidInput(message),
        (Some("SlowDown" | "ServiceUnavailable" | "InternalError" | "RequestTimeout"), _) => {
            StorageError::Transient(message)
        }
        (Some("NotFound"), _) | (_, Some(404)) => not_found(),
        (_, Some(403)) => StorageError::PermissionDenied(message),
        (_, Some(409)) if key.is_none() => StorageError::AlreadyExists(bucket.to_string()),
        (_, Some(500..=599)) => StorageError::Transient(message),
        (code, _) => StorageError::Service { code: code.unwrap_or("Unknown").to_string(), message },
    }
}
