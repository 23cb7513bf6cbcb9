use std::time::Duration;

use url::Url;

use crate::cli::storage::aws_s3::AWSS3CliArgs;
use crate::core::config::settings::{ConfigError, Settings};
use crate::core::config::{
    BUCKET_WAIT_TIMEOUT_KEY, DEFAULT_BUCKET_WAIT_TIMEOUT_SECS, ENDPOINT_KEY, FORCE_PATH_STYLE_KEY, REGION_KEY,
};

/// Parameters of the S3 client after merging CLI, environment and settings file.
#[derive(Debug, Clone, PartialEq)]
pub struct AWSS3ValidatedArgs {
    pub region: String,
    pub endpoint: Option<Url>,
    pub force_path_style: bool,
    pub bucket_wait_timeout: Duration,
}

impl AWSS3ValidatedArgs {
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Self::resolve(&AWSS3CliArgs::default(), settings)
    }

    /// CLI arguments (and their `env` fallbacks) take precedence over the settings file.
    ///
    /// Path style addressing defaults to on whenever a custom endpoint is configured.
    pub fn resolve(args: &AWSS3CliArgs, settings: &Settings) -> Result<Self, ConfigError> {
        let region = match &args.region {
            Some(region) => region.clone(),
            None => settings.get(REGION_KEY)?.to_string(),
        };
        if region.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: REGION_KEY.to_string(),
                value: region,
                reason: "region must not be empty".to_string(),
            });
        }

        let endpoint = match &args.endpoint {
            Some(endpoint) => Some(endpoint.clone()),
            None => settings.get_parsed::<Url>(ENDPOINT_KEY)?,
        };

        let force_path_style = match args.force_path_style {
            Some(force_path_style) => force_path_style,
            None => settings.get_parsed::<bool>(FORCE_PATH_STYLE_KEY)?.unwrap_or(endpoint.is_some()),
        };

        let timeout_secs = match args.bucket_wait_timeout_secs {
            Some(secs) => secs,
            None => settings.get_parsed::<u64>(BUCKET_WAIT_TIMEOUT_KEY)?.unwrap_or(DEFAULT_BUCKET_WAIT_TIMEOUT_SECS),
        };

        Ok(Self { region, endpoint, force_path_style, bucket_wait_timeout: Duration::from_secs(timeout_secs) })
    }
}
