use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use assert_matches::assert_matches;
use clap::Parser as _;
use rstest::*;
use url::Url;

use crate::cli::storage::aws_s3::AWSS3CliArgs;
use crate::cli::{Cli, Commands};
use crate::core::config::settings::{ConfigError, Settings};
use crate::core::helper::StorageHelper;
use crate::types::params::AWSS3ValidatedArgs;

#[rstest]
fn test_resolve_from_settings_only() {
    let settings = Settings::parse("aws.region=eu-central-1\n").unwrap();

    let args = AWSS3ValidatedArgs::from_settings(&settings).unwrap();

    assert_eq!(
        args,
        AWSS3ValidatedArgs {
            region: "eu-central-1".to_string(),
            endpoint: None,
            force_path_style: false,
            bucket_wait_timeout: Duration::from_secs(60),
        }
    );
}

#[rstest]
fn test_endpoint_turns_on_path_style() {
    let settings = Settings::from_pairs([("aws.region", "us-east-1"), ("aws.endpoint", "http://localhost:4566")]);

    let args = AWSS3ValidatedArgs::from_settings(&settings).unwrap();

    assert_eq!(args.endpoint, Some(Url::parse("http://localhost:4566").unwrap()));
    assert!(args.force_path_style);
}

#[rstest]
fn test_explicit_path_style_wins_over_endpoint_default() {
    let settings = Settings::from_pairs([
        ("aws.region", "us-east-1"),
        ("aws.endpoint", "http://localhost:4566"),
        ("aws.force-path-style", "false"),
        ("storage.bucket-wait-timeout-secs", "5"),
    ]);

    let args = AWSS3ValidatedArgs::from_settings(&settings).unwrap();

    assert!(!args.force_path_style);
    assert_eq!(args.bucket_wait_timeout, Duration::from_secs(5));
}

#[rstest]
fn test_cli_args_take_precedence() {
    let settings = Settings::from_pairs([("aws.region", "us-east-1"), ("storage.bucket-wait-timeout-secs", "5")]);
    let cli_args = AWSS3CliArgs {
        region: Some("ap-south-1".to_string()),
        endpoint: Some(Url::parse("http://minio:9000").unwrap()),
        force_path_style: None,
        bucket_wait_timeout_secs: Some(120),
    };

    let args = AWSS3ValidatedArgs::resolve(&cli_args, &settings).unwrap();

    assert_eq!(args.region, "ap-south-1");
    assert!(args.force_path_style);
    assert_eq!(args.bucket_wait_timeout, Duration::from_secs(120));
}

#[rstest]
#[case::missing_region("", "aws.region")]
#[case::empty_region("aws.region=  ", "aws.region")]
#[case::bad_endpoint("aws.region=us-east-1\naws.endpoint=not a url", "aws.endpoint")]
#[case::bad_timeout("aws.region=us-east-1\nstorage.bucket-wait-timeout-secs=soon", "storage.bucket-wait-timeout-secs")]
fn test_invalid_settings(#[case] content: &str, #[case] bad_key: &str) {
    let settings = Settings::parse(content).unwrap();

    let err = AWSS3ValidatedArgs::from_settings(&settings).unwrap_err();

    let key = match err {
        ConfigError::MissingKey(key) => key,
        ConfigError::InvalidValue { key, .. } => key,
        other => panic!("unexpected error: {other}"),
    };
    assert_eq!(key, bad_key);
}

#[rstest]
fn test_cli_parses_upload() {
    let cli = Cli::try_parse_from([
        "s3-helper",
        "--region",
        "eu-west-1",
        "--force-path-style",
        "false",
        "upload",
        "nabo-user-images",
        "group-images/",
        "./Hello.pdf",
        "--name",
        "Renamed.pdf",
    ])
    .unwrap();

    assert_eq!(cli.aws_s3_args.region.as_deref(), Some("eu-west-1"));
    assert_eq!(cli.aws_s3_args.force_path_style, Some(false));
    assert_eq!(
        cli.command,
        Commands::Upload {
            bucket: "nabo-user-images".to_string(),
            prefix: "group-images/".to_string(),
            source: PathBuf::from("./Hello.pdf"),
            name: Some("Renamed.pdf".to_string()),
        }
    );
}

#[rstest]
fn test_cli_presign_default_expiry() {
    let cli = Cli::try_parse_from(["s3-helper", "presign", "bucket", "docs/", "a.txt"]).unwrap();
    assert_matches!(cli.command, Commands::Presign { expires_in_secs: 3600, .. });
}

#[rstest]
fn test_cli_explicit_settings_file_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("custom.properties");
    let cli = Cli::try_parse_from(["s3-helper", "list-buckets", "--settings", missing.to_str().unwrap()]).unwrap();

    assert_matches!(cli.load_settings(), Err(ConfigError::Read { path, .. }) if path == missing);
}

#[rstest]
#[tokio::test]
async fn test_shared_helper_is_built_once() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "aws.region=us-east-1").unwrap();
    writeln!(file, "aws.endpoint=http://localhost:4566").unwrap();

    let (first, second) = tokio::join!(StorageHelper::shared(file.path()), StorageHelper::shared(file.path()));
    let (first, second) = (first.unwrap(), second.unwrap());
    assert!(std::ptr::eq(first, second));

    // Later callers get the same instance whatever path they pass
    let third = StorageHelper::shared("/does/not/exist.properties").await.unwrap();
    assert!(std::ptr::eq(first, third));
}
