pub mod env_interpolation;
pub mod settings;

/// Settings file used when none is given on the command line
pub const DEFAULT_SETTINGS_FILE: &str = "application.properties";

/// Region the storage client is built for
pub const REGION_KEY: &str = "aws.region";
/// Custom endpoint url (LocalStack, MinIO)
pub const ENDPOINT_KEY: &str = "aws.endpoint";
pub const FORCE_PATH_STYLE_KEY: &str = "aws.force-path-style";
/// Upper bound on the wait after a bucket creation request
pub const BUCKET_WAIT_TIMEOUT_KEY: &str = "storage.bucket-wait-timeout-secs";

pub const DEFAULT_BUCKET_WAIT_TIMEOUT_SECS: u64 = 60;
