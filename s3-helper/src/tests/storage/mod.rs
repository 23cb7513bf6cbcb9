use std::time::{Duration, Instant};

use assert_matches::assert_matches;
use rstest::*;
use url::Url;

use crate::core::client::storage::error::classify_service_error;
use crate::core::client::storage::memory::InMemoryStorage;
use crate::core::client::storage::{build_object_url, StorageClient, StorageError};
use crate::setup::build_helper;
use crate::tests::common::{temp_source_file, unique_bucket_name};
use crate::types::params::AWSS3ValidatedArgs;

#[rstest]
#[case::no_such_key(Some("NoSuchKey"), Some(404), Some("a.txt"), "NotFound")]
#[case::no_such_bucket(Some("NoSuchBucket"), Some(404), Some("a.txt"), "BucketNotFound")]
#[case::bare_404_object(None, Some(404), Some("a.txt"), "NotFound")]
#[case::bare_404_bucket(None, Some(404), None, "BucketNotFound")]
#[case::already_owned(Some("BucketAlreadyOwnedByYou"), Some(409), None, "AlreadyExists")]
#[case::already_exists(Some("BucketAlreadyExists"), Some(409), None, "AlreadyExists")]
#[case::conflict_on_object(None, Some(409), Some("a.txt"), "Service")]
#[case::not_empty(Some("BucketNotEmpty"), Some(409), None, "BucketNotEmpty")]
#[case::access_denied(Some("AccessDenied"), Some(403), None, "PermissionDenied")]
#[case::bare_403(None, Some(403), Some("a.txt"), "PermissionDenied")]
#[case::invalid_name(Some("InvalidBucketName"), Some(400), None, "InvalidInput")]
#[case::slow_down(Some("SlowDown"), Some(503), None, "Transient")]
#[case::bare_500(None, Some(500), None, "Transient")]
#[case::unknown(Some("SomethingNew"), Some(400), None, "Service")]
fn test_classify_service_error(
    #[case] code: Option<&str>,
    #[case] status: Option<u16>,
    #[case] key: Option<&str>,
    #[case] expected: &str,
) {
    let err = classify_service_error(code, status, "service message".to_string(), "bucket", key);
    let kind = match err {
        StorageError::NotFound { .. } => "NotFound",
        StorageError::BucketNotFound(_) => "BucketNotFound",
        StorageError::AlreadyExists(_) => "AlreadyExists",
        StorageError::BucketNotEmpty(_) => "BucketNotEmpty",
        StorageError::PermissionDenied(_) => "PermissionDenied",
        StorageError::InvalidInput(_) => "InvalidInput",
        StorageError::Transient(_) => "Transient",
        StorageError::Service { .. } => "Service",
        StorageError::WaitTimeout { .. } | StorageError::Io { .. } => "Other",
    };
    assert_eq!(kind, expected);
}

#[rstest]
fn test_classify_keeps_service_message() {
    let err = classify_service_error(Some("SomethingNew"), None, "try again later".to_string(), "bucket", None);
    assert_matches!(err, StorageError::Service { code, message } if code == "SomethingNew" && message == "try again later");

    let err = classify_service_error(None, None, "no code".to_string(), "bucket", None);
    assert_matches!(err, StorageError::Service { code, .. } if code == "Unknown");
}

#[rstest]
#[case::virtual_host("https://s3.eu-west-1.amazonaws.com", false, "https://b.s3.eu-west-1.amazonaws.com/k/x.txt")]
#[case::path_style("http://localhost:4566", true, "http://localhost:4566/b/k/x.txt")]
#[case::path_style_with_base_path("http://minio:9000/storage/", true, "http://minio:9000/storage/b/k/x.txt")]
fn test_build_object_url(#[case] base: &str, #[case] path_style: bool, #[case] expected: &str) {
    let base = Url::parse(base).unwrap();
    assert_eq!(build_object_url(&base, path_style, "b", "k/x.txt").unwrap(), expected);
}

#[rstest]
#[case::empty_segment("group-images//Hello.pdf", "http://localhost:4566/b/group-images//Hello.pdf")]
#[case::parent_segment("group-images/../Hello.pdf", "http://localhost:4566/b/group-images/%2E%2E/Hello.pdf")]
#[case::current_segment("./group-images/./Hello.pdf", "http://localhost:4566/b/%2E/group-images/%2E/Hello.pdf")]
#[case::leading_parent("../Hello.pdf", "http://localhost:4566/b/%2E%2E/Hello.pdf")]
#[case::dots_inside_name("group-images/..Hello..pdf", "http://localhost:4566/b/group-images/..Hello..pdf")]
#[case::encoded_dot_stays_distinct("%2E%2E/Hello.pdf", "http://localhost:4566/b/%252E%252E/Hello.pdf")]
fn test_build_object_url_keeps_key_segments(#[case] key: &str, #[case] expected: &str) {
    let base = Url::parse("http://localhost:4566").unwrap();
    assert_eq!(build_object_url(&base, true, "b", key).unwrap(), expected);
}

#[rstest]
fn test_build_object_url_does_not_resolve_dot_segments_virtual_host() {
    let base = Url::parse("https://s3.us-east-1.amazonaws.com").unwrap();
    let url = build_object_url(&base, false, "b", "group-images/../Hello.pdf").unwrap();
    assert_eq!(url, "https://b.s3.us-east-1.amazonaws.com/group-images/%2E%2E/Hello.pdf");
}

#[rstest]
#[tokio::test]
async fn test_wait_until_bucket_exists_returns_for_present_bucket() {
    let storage = InMemoryStorage::new();
    storage.create_bucket("bucket").await.unwrap();

    storage.wait_until_bucket_exists("bucket", Duration::ZERO).await.unwrap();
}

#[rstest]
#[tokio::test]
async fn test_wait_until_bucket_exists_times_out() {
    let storage = InMemoryStorage::new();
    let started = Instant::now();

    let result = storage.wait_until_bucket_exists("never-created", Duration::from_millis(700)).await;

    assert_matches!(result, Err(StorageError::WaitTimeout { bucket, waited }) if bucket == "never-created" && waited >= Duration::from_millis(700));
    // One poll interval plus the shortened final sleep
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[rstest]
#[tokio::test]
async fn test_in_memory_rejects_empty_bucket_name() {
    let storage = InMemoryStorage::new();
    assert_matches!(storage.create_bucket("").await, Err(StorageError::InvalidInput(_)));
}

#[rstest]
#[tokio::test]
async fn test_in_memory_delete_objects_ignores_missing_keys() {
    let storage = InMemoryStorage::new();
    storage.create_bucket("bucket").await.unwrap();

    storage.delete_objects("bucket", &["missing".to_string()]).await.unwrap();
    assert_matches!(
        storage.delete_objects("other", &["missing".to_string()]).await,
        Err(StorageError::BucketNotFound(bucket)) if bucket == "other"
    );
}

/// Runs against LocalStack on `localhost:4566`, start it with `docker run -p 4566:4566 localstack/localstack`
#[rstest]
#[ignore = "requires a running LocalStack instance"]
#[tokio::test]
async fn test_localstack_round_trip() {
    let args = AWSS3ValidatedArgs {
        region: "us-east-1".to_string(),
        endpoint: Some(Url::parse("http://localhost:4566").unwrap()),
        force_path_style: true,
        bucket_wait_timeout: Duration::from_secs(30),
    };
    let helper = build_helper(&args).await.unwrap();
    let bucket = unique_bucket_name();
    let source = temp_source_file(b"localstack round trip");
    let download_dir = tempfile::tempdir().unwrap();

    helper.create_bucket(&bucket).await.unwrap();
    assert!(helper.bucket_exists(&bucket).await.unwrap());
    assert!(helper.list_buckets().await.unwrap().contains(&bucket));

    helper.upload_object_as(&bucket, "group-images/", "Hello.pdf", source.path()).await.unwrap();
    assert!(helper.file_exists(&bucket, "group-images/", "Hello.pdf").await.unwrap());

    let metadata = helper.object_metadata(&bucket, "group-images/", "Hello.pdf").await.unwrap();
    assert_eq!(metadata.size, 21);

    let written = helper.download_object(&bucket, "group-images/", "Hello.pdf", download_dir.path()).await.unwrap();
    assert_eq!(std::fs::read(written).unwrap(), b"localstack round trip");

    let url = helper.object_url(&bucket, "group-images/", "Hello.pdf").await.unwrap();
    assert_eq!(url, format!("http://localhost:4566/{bucket}/group-images/Hello.pdf"));

    let presigned =
        helper.presigned_url(&bucket, "group-images/", "Hello.pdf", Duration::from_secs(300)).await.unwrap();
    assert!(presigned.starts_with(&format!("http://localhost:4566/{bucket}/group-images/Hello.pdf?")));
    assert!(presigned.contains("X-Amz-Expires=300"));

    helper.delete_object(&bucket, "group-images/Hello.pdf").await.unwrap();
    // Deleting an absent key is not an error
    helper.delete_object(&bucket, "group-images/Hello.pdf").await.unwrap();
    assert_matches!(
        helper.delete_object(&unique_bucket_name(), "group-images/Hello.pdf").await,
        Err(StorageError::BucketNotFound(_))
    );
    assert!(!helper.file_exists(&bucket, "group-images/", "Hello.pdf").await.unwrap());
    helper.delete_bucket(&bucket).await.unwrap();
    assert!(!helper.bucket_exists(&bucket).await.unwrap());
}
