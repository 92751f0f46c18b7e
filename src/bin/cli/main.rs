use anyhow::{Context, Result};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use pomes_s3::{
    app::{app_prefix_from_env, config_from_env, AppBuilder, StorageBackend},
    BucketName, DataRange, Engine, ObjectTags, S3Service, S3ServiceImpl, Scope,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "pomes-s3")]
#[command(about = "Store and retrieve objects on AWS S3 and MinIO", long_about = None)]
struct Cli {
    /// Engine to use, defaults to the first configured one
    #[arg(short, long, global = true, env = "POMES_S3_CLI_ENGINE")]
    engine: Option<String>,

    /// Bucket to use, defaults to the engine's configured bucket
    #[arg(short, long, global = true)]
    bucket: Option<String>,

    /// Prefix of the configuration environment variables
    #[arg(long, global = true, env = "POMES_APP_PREFIX")]
    app_prefix: Option<String>,

    /// Storage backend: remote or memory
    #[arg(long, global = true, default_value = "remote")]
    backend: String,

    /// Log level
    #[arg(long, global = true, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the configured engines
    Engines,

    /// Verify the bucket exists, creating it when missing
    Startup,

    /// Upload a file
    Put {
        prefix: String,
        identifier: String,
        /// File path to upload
        file: PathBuf,
        /// Content type of the object
        #[arg(short, long)]
        mimetype: Option<String>,
        /// Metadata tag as key=value, may be repeated
        #[arg(short, long = "tag", value_parser = parse_tag)]
        tags: Vec<(String, String)>,
    },

    /// Download an object into a file
    Get {
        prefix: String,
        identifier: String,
        /// Output file path, defaults to the engine's temp folder
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print an object's contents
    Cat {
        prefix: String,
        identifier: String,
        /// Inclusive byte range, as begin-end
        #[arg(short, long)]
        range: Option<DataRange>,
    },

    /// Show an object's attributes
    Stat { prefix: String, identifier: String },

    /// Show an object's metadata tags
    Tags { prefix: String, identifier: String },

    /// List objects under a prefix
    Ls {
        prefix: String,
        #[arg(long, default_value_t = 1000)]
        max: usize,
    },

    /// Remove an object
    Rm { prefix: String, identifier: String },

    /// Remove objects under a prefix
    RmPrefix {
        prefix: String,
        #[arg(long, default_value_t = pomes_s3::FOLDER_REMOVE_LIMIT)]
        max: usize,
    },
}

fn parse_tag(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("invalid tag '{}', expected key=value", value))
}

impl Cli {
    fn init_logging(&self) -> Result<()> {
        let env_filter = EnvFilter::try_new(self.log_level.to_lowercase())
            .context("Invalid log level")?;

        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();

        Ok(())
    }

    fn storage_backend(&self) -> Result<StorageBackend> {
        match self.backend.to_lowercase().as_str() {
            "remote" => Ok(StorageBackend::Remote),
            "memory" => Ok(StorageBackend::InMemory),
            _ => anyhow::bail!("Unknown storage backend: {}", self.backend),
        }
    }

    fn build_app(&self) -> Result<S3ServiceImpl> {
        let prefix = self.app_prefix.clone().unwrap_or_else(app_prefix_from_env);
        let config = config_from_env(&prefix).context("Failed to read configuration")?;
        if config.is_empty() {
            anyhow::bail!("No S3 engine configured; set {}_S3_ENGINE or {}_S3_ENGINES", prefix, prefix);
        }

        Ok(AppBuilder::new()
            .with_s3_config(config)
            .with_storage_backend(self.storage_backend()?)
            .build())
    }

    fn scope(&self, app: &S3ServiceImpl) -> Result<Scope> {
        let engine: Option<Engine> = match self.engine.as_deref() {
            Some(name) => Some(app.config().resolve_engine_name(Some(name))?),
            None => None,
        };
        let bucket = self
            .bucket
            .as_deref()
            .map(BucketName::new)
            .transpose()
            .context("Invalid bucket name")?;

        Ok(Scope::builder()
            .maybe_engine(engine)
            .maybe_bucket(bucket)
            .build())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: &Cli, app: &S3ServiceImpl) -> Result<()> {
    let scope = cli.scope(app)?;

    match &cli.command {
        Commands::Engines => print_json(&app.engines())?,
        Commands::Startup => print_json(&app.startup(&scope).await?)?,
        Commands::Put {
            prefix,
            identifier,
            file,
            mimetype,
            tags,
        } => {
            let tags: ObjectTags = tags.iter().cloned().collect();
            app.file_store(&scope, prefix, identifier, file, mimetype.as_deref(), &tags)
                .await
                .with_context(|| format!("Failed to upload {}", file.display()))?;
            info!("Uploaded {} to {}/{}", file.display(), prefix, identifier);
        }
        Commands::Get {
            prefix,
            identifier,
            output,
        } => {
            let path = app
                .file_retrieve(&scope, prefix, identifier, output.as_deref())
                .await?;
            print_json(&path)?;
        }
        Commands::Cat {
            prefix,
            identifier,
            range,
        } => {
            let data = app
                .data_retrieve(&scope, prefix, identifier, *range)
                .await?
                .with_context(|| format!("{}/{} not found", prefix, identifier))?;
            write_stdout(&data)?;
        }
        Commands::Stat { prefix, identifier } => {
            print_json(&app.item_stat(&scope, prefix, identifier).await?)?
        }
        Commands::Tags { prefix, identifier } => {
            print_json(&app.item_tags(&scope, prefix, identifier).await?)?
        }
        Commands::Ls { prefix, max } => print_json(&app.items_list(&scope, prefix, *max).await?)?,
        Commands::Rm { prefix, identifier } => {
            print_json(&app.item_remove(&scope, prefix, identifier).await?)?
        }
        Commands::RmPrefix { prefix, max } => {
            let removal = app.items_remove(&scope, prefix, *max).await?;
            print_json(&removal.removed)?;
            if let Some(err) = removal.aborted {
                return Err(err).context(format!(
                    "Removal under {} stopped after {} items",
                    prefix, removal.removed
                ));
            }
        }
    }

    Ok(())
}

fn write_stdout(data: &Bytes) -> Result<()> {
    use std::io::Write;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(data)?;
    stdout.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging()?;

    let app = cli.build_app()?;
    run(&cli, &app).await
}
