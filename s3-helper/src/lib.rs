/// Contains the CLI arguments for the helper binary
pub mod cli;
/// Contains the core logic: settings, storage clients and the helper facade
pub mod core;
/// contains all the error handling / errors that can be returned by the helper
pub mod error;
/// Builds the storage client and helper from validated parameters
pub mod setup;
/// Shared value types
pub mod types;
/// Contains all the utils that are used by the helper
pub mod utils;

#[cfg(test)]
pub mod tests;

pub use core::client::storage::{StorageClient, StorageError};
pub use core::config::settings::{ConfigError, Settings};
pub use core::helper::StorageHelper;
pub use error::{HelperError, HelperResult};
pub use types::object::ObjectRef;
