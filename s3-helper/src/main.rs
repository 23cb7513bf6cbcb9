use std::time::Duration;

use clap::Parser as _;
use dotenvy::dotenv;
use s3_helper::cli::{Cli, Commands};
use s3_helper::setup::build_helper;
use s3_helper::types::params::AWSS3ValidatedArgs;
use s3_helper::utils::logging::init_logging;
use s3_helper::{HelperResult, StorageHelper};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    dotenv().ok();
    init_logging()?;
    let cli = Cli::parse();
    debug!("Executing command: {:?}", cli.command);

    if let Err(e) = run(&cli).await {
        error!(error = %e, error_chain = ?e, "Command failed");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: &Cli) -> HelperResult<()> {
    let settings = cli.load_settings()?;
    let args = AWSS3ValidatedArgs::resolve(&cli.aws_s3_args, &settings)?;
    let helper = build_helper(&args).await?;
    execute(&helper, &cli.command).await
}

#[allow(clippy::print_stdout)]
async fn execute(helper: &StorageHelper, command: &Commands) -> HelperResult<()> {
    match command {
        Commands::CreateBucket { bucket } => helper.create_bucket(bucket).await?,
        Commands::ListBuckets => {
            for bucket in helper.list_buckets().await? {
                println!("{bucket}");
            }
        }
        Commands::DeleteBucket { bucket } => helper.delete_bucket(bucket).await?,
        Commands::DeleteObject { bucket, key } => helper.delete_object(bucket, key).await?,
        Commands::Upload { bucket, prefix, source, name } => {
            let object = match name {
                Some(name) => helper.upload_object_as(bucket, prefix, name, source).await?,
                None => helper.upload_object(bucket, prefix, source).await?,
            };
            println!("{object}");
        }
        Commands::Url { bucket, prefix, name } => println!("{}", helper.object_url(bucket, prefix, name).await?),
        Commands::Presign { bucket, prefix, name, expires_in_secs } => {
            let url = helper.presigned_url(bucket, prefix, name, Duration::from_secs(*expires_in_secs)).await?;
            println!("{url}");
        }
        Commands::Download { bucket, prefix, name, destination } => {
            let path = helper.download_object(bucket, prefix, name, destination).await?;
            println!("{}", path.display());
        }
        Commands::Stat { bucket, prefix, name } => {
            let metadata = helper.object_metadata(bucket, prefix, name).await?;
            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }
        Commands::Exists { bucket, prefix, name } => println!("{}", helper.file_exists(bucket, prefix, name).await?),
        Commands::BucketExists { bucket } => println!("{}", helper.bucket_exists(bucket).await?),
    }
    info!("Command completed");
    Ok(())
}
