use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::core::config::settings::{ConfigError, Settings};
use crate::core::config::DEFAULT_SETTINGS_FILE;

pub mod storage;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Properties file holding `aws.region` and the other settings.
    /// Defaults to `application.properties` when that file exists.
    #[arg(env = "S3_HELPER_SETTINGS_FILE", long, global = true)]
    pub settings: Option<PathBuf>,

    #[clap(flatten)]
    pub aws_s3_args: storage::aws_s3::AWSS3CliArgs,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Settings from `--settings`, else from the default file if present, else empty.
    ///
    /// An explicitly given file that cannot be read is an error.
    pub fn load_settings(&self) -> Result<Settings, ConfigError> {
        match &self.settings {
            Some(path) => Settings::load(path),
            None if Path::new(DEFAULT_SETTINGS_FILE).is_file() => Settings::load(DEFAULT_SETTINGS_FILE),
            None => Ok(Settings::default()),
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Create a bucket and wait until it is visible
    CreateBucket { bucket: String },
    /// Print the name of every bucket
    ListBuckets,
    /// Delete an empty bucket
    DeleteBucket { bucket: String },
    /// Delete one object by its full key
    DeleteObject { bucket: String, key: String },
    /// Upload a local file under `<prefix><name>`
    Upload {
        bucket: String,
        /// Prepended verbatim to the object name, include a trailing `/` for folders
        prefix: String,
        /// Local file to upload
        source: PathBuf,
        /// Object name, defaults to the file name of `source`
        #[arg(long)]
        name: Option<String>,
    },
    /// Print the URL of an object
    Url { bucket: String, prefix: String, name: String },
    /// Print a time limited URL of an object
    Presign {
        bucket: String,
        prefix: String,
        name: String,
        #[arg(long, default_value_t = 3600)]
        expires_in_secs: u64,
    },
    /// Download an object into an existing directory
    Download { bucket: String, prefix: String, name: String, destination: PathBuf },
    /// Print the stored metadata of an object as JSON
    Stat { bucket: String, prefix: String, name: String },
    /// Check whether an object exists
    Exists { bucket: String, prefix: String, name: String },
    /// Check whether a bucket exists
    BucketExists { bucket: String },
}
