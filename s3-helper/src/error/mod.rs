use thiserror::Error;

use crate::core::client::storage::StorageError;
use crate::core::config::settings::ConfigError;

/// Result type for helper operations
pub type HelperResult<T> = Result<T, HelperError>;

/// Error types for the helper binary and setup code
#[derive(Error, Debug)]
pub enum HelperError {
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
