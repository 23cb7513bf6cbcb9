use clap::Args;
use url::Url;

/// Parameters used to config AWS S3.
/// Every value left unset here is read from the settings file.
#[derive(Debug, Clone, Default, Args)]
pub struct AWSS3CliArgs {
    /// The region the client is built for, e.g. `eu-west-1`.
    #[arg(env = "S3_HELPER_AWS_REGION", long)]
    pub region: Option<String>,

    /// Custom endpoint url, for LocalStack or MinIO.
    #[arg(env = "S3_HELPER_AWS_ENDPOINT", long)]
    pub endpoint: Option<Url>,

    /// Address buckets as the first path segment instead of a sub domain.
    #[arg(env = "S3_HELPER_AWS_FORCE_PATH_STYLE", long)]
    pub force_path_style: Option<bool>,

    /// Seconds to wait for a new bucket to become visible.
    #[arg(env = "S3_HELPER_BUCKET_WAIT_TIMEOUT_SECS", long)]
    pub bucket_wait_timeout_secs: Option<u64>,
}
