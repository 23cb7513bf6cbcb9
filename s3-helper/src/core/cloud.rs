use aws_config::{BehaviorVersion, Region, SdkConfig};

use crate::types::params::AWSS3ValidatedArgs;

/// Cloud provider
/// Holds the shared SDK configuration the storage client is built from.
#[derive(Clone)]
pub enum CloudProvider {
    AWS(Box<SdkConfig>),
}

impl CloudProvider {
    /// Load the AWS configuration for the region in `args`.
    ///
    /// Credentials come from the default provider chain and are resolved lazily on the first request.
    pub async fn load(args: &AWSS3ValidatedArgs) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(args.region.clone()));
        if let Some(endpoint) = &args.endpoint {
            loader = loader.endpoint_url(endpoint.as_str());
        }
        CloudProvider::AWS(Box::new(loader.load().await))
    }

    pub fn get_aws_config(&self) -> &SdkConfig {
        match self {
            CloudProvider::AWS(config) => config.as_ref(),
        }
    }

    pub fn get_provider_name(&self) -> &'static str {
        match self {
            CloudProvider::AWS(_) => "AWS",
        }
    }
}

impl std::fmt::Debug for CloudProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.get_provider_name())
    }
}
