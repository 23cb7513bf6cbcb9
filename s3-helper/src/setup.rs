use std::sync::Arc;

use tracing::{debug, info};

use crate::core::client::storage::s3::AWSS3;
use crate::core::cloud::CloudProvider;
use crate::core::helper::StorageHelper;
use crate::error::HelperResult;
use crate::types::params::AWSS3ValidatedArgs;

/// Loads the cloud provider configuration for `args`
pub async fn setup_cloud_provider(args: &AWSS3ValidatedArgs) -> Arc<CloudProvider> {
    let cloud_provider = CloudProvider::load(args).await;
    info!("Cloud Provider initialized - {}", cloud_provider.get_provider_name());
    Arc::new(cloud_provider)
}

/// Build a [`StorageHelper`] backed by S3 for the given parameters
pub async fn build_helper(args: &AWSS3ValidatedArgs) -> HelperResult<StorageHelper> {
    debug!("Storage Params: {:?}", args);
    let cloud_provider = setup_cloud_provider(args).await;

    let s3 = AWSS3::new(cloud_provider.get_aws_config(), args)?;
    info!(region = %s3.region(), endpoint = ?args.endpoint, "S3 client initialized");

    Ok(StorageHelper::new(Arc::new(s3)).with_bucket_wait_timeout(args.bucket_wait_timeout))
}
