use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    adapters::outbound::storage::{InMemoryConnector, SdkConnector},
    domain::{
        errors::StorageError,
        models::{AccessParams, EngineEndpoint, S3Config},
        value_objects::{BucketName, Engine},
    },
    ports::storage::EngineConnector,
    services::S3ServiceImpl,
};

/// Prefix used for environment variables when none is configured
pub const DEFAULT_APP_PREFIX: &str = "POMES";

/// Variable overriding the environment variable prefix
pub const APP_PREFIX_VAR: &str = "POMES_APP_PREFIX";

/// Configuration for the application
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub s3: S3Config,
    pub storage_backend: StorageBackend,
}

/// Storage backend configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    /// The configured AWS and MinIO services
    #[default]
    Remote,
    /// Objects kept in process memory, per engine and bucket
    InMemory,
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
}

impl AppBuilder {
    /// Create a new application builder
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    /// Configure the application with custom settings
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Configure the engines
    pub fn with_s3_config(mut self, s3: S3Config) -> Self {
        self.config.s3 = s3;
        self
    }

    /// Add one engine's access parameters
    pub fn with_engine(mut self, params: AccessParams) -> Result<Self, AppError> {
        self.config.s3.setup(params)?;
        Ok(self)
    }

    /// Configure storage backend
    pub fn with_storage_backend(mut self, backend: StorageBackend) -> Self {
        self.config.storage_backend = backend;
        self
    }

    /// Build the storage facade
    pub fn build(self) -> S3ServiceImpl {
        let connector: Arc<dyn EngineConnector> = match self.config.storage_backend {
            StorageBackend::Remote => Arc::new(SdkConnector),
            StorageBackend::InMemory => Arc::new(InMemoryConnector::new()),
        };

        S3ServiceImpl::new(self.config.s3, connector)
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Missing environment variable {name}")]
    MissingVariable { name: String },

    #[error("Invalid value '{value}' for environment variable {name}")]
    InvalidVariable { name: String, value: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Create a facade over the engines configured in the environment
pub fn create_app_from_env() -> Result<S3ServiceImpl, AppError> {
    let config = config_from_env(&app_prefix_from_env())?;
    Ok(AppBuilder::new().with_s3_config(config).build())
}

/// Create an in-memory facade for testing and development
pub fn create_in_memory_app(config: S3Config) -> S3ServiceImpl {
    AppBuilder::new()
        .with_s3_config(config)
        .with_storage_backend(StorageBackend::InMemory)
        .build()
}

/// Prefix for environment variables, from `POMES_APP_PREFIX` or the default
pub fn app_prefix_from_env() -> String {
    std::env::var(APP_PREFIX_VAR)
        .ok()
        .map(|prefix| prefix.trim().to_string())
        .filter(|prefix| !prefix.is_empty())
        .unwrap_or_else(|| DEFAULT_APP_PREFIX.to_string())
}

/// Read the engine configuration from the process environment
pub fn config_from_env(prefix: &str) -> Result<S3Config, AppError> {
    config_from_lookup(prefix, |name| std::env::var(name).ok())
}

/// Read the engine configuration through `lookup`.
///
/// `{prefix}_S3_ENGINE` selects a single engine whose variables use the `S3`
/// tag. Otherwise `{prefix}_S3_ENGINES` lists engines, each reading its
/// variables under its own tag (`AWS`, `MINIO`).
pub fn config_from_lookup<F>(prefix: &str, lookup: F) -> Result<S3Config, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let env = EnvReader { prefix, lookup };
    let mut config = S3Config::new();

    if let Some(name) = env.optional("S3", "ENGINE") {
        let engine = env.engine(&env.var_name("S3", "ENGINE"), &name)?;
        config.setup(env.access_params(engine, "S3")?)?;
        return Ok(config);
    }

    if let Some(names) = env.optional("S3", "ENGINES") {
        let var = env.var_name("S3", "ENGINES");
        for name in names.split(',').map(str::trim).filter(|name| !name.is_empty()) {
            let engine = env.engine(&var, name)?;
            config.setup(env.access_params(engine, engine.env_tag())?)?;
        }
    }

    Ok(config)
}

/// Parse a boolean the way the environment spells it
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "n" | "no" | "off" => Some(false),
        _ => None,
    }
}

struct EnvReader<'a, F> {
    prefix: &'a str,
    lookup: F,
}

impl<F> EnvReader<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn var_name(&self, tag: &str, field: &str) -> String {
        format!("{}_{}_{}", self.prefix, tag, field)
    }

    fn optional(&self, tag: &str, field: &str) -> Option<String> {
        (self.lookup)(&self.var_name(tag, field))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, tag: &str, field: &str) -> Result<String, AppError> {
        self.optional(tag, field)
            .ok_or_else(|| AppError::MissingVariable {
                name: self.var_name(tag, field),
            })
    }

    fn engine(&self, var: &str, value: &str) -> Result<Engine, AppError> {
        value.parse().map_err(|_| AppError::InvalidVariable {
            name: var.to_string(),
            value: value.to_string(),
        })
    }

    fn access_params(&self, engine: Engine, tag: &str) -> Result<AccessParams, AppError> {
        let bucket = self.required(tag, "BUCKET_NAME")?;
        let bucket_name = BucketName::new(bucket.as_str()).map_err(|_| AppError::InvalidVariable {
            name: self.var_name(tag, "BUCKET_NAME"),
            value: bucket,
        })?;

        let endpoint = match engine {
            Engine::Aws => EngineEndpoint::Aws {
                region: self.required(tag, "REGION_NAME")?,
            },
            Engine::Minio => {
                let secure_access = match self.optional(tag, "SECURE_ACCESS") {
                    None => false,
                    Some(value) => parse_bool(&value).ok_or_else(|| AppError::InvalidVariable {
                        name: self.var_name(tag, "SECURE_ACCESS"),
                        value,
                    })?,
                };
                EngineEndpoint::Minio {
                    endpoint_url: self.required(tag, "ENDPOINT_URL")?,
                    secure_access,
                }
            }
        };

        Ok(AccessParams {
            access_key: self.required(tag, "ACCESS_KEY")?,
            secret_key: self.required(tag, "SECRET_KEY")?,
            bucket_name,
            temp_folder: PathBuf::from(self.required(tag, "TEMP_FOLDER")?),
            endpoint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_single_engine_from_env() {
        let config = config_from_lookup(
            "POMES",
            lookup(&[
                ("POMES_S3_ENGINE", "minio"),
                ("POMES_S3_ACCESS_KEY", "minioadmin"),
                ("POMES_S3_SECRET_KEY", "minioadmin"),
                ("POMES_S3_BUCKET_NAME", "test-bucket"),
                ("POMES_S3_TEMP_FOLDER", "/tmp/pomes"),
                ("POMES_S3_ENDPOINT_URL", "localhost:9000"),
                ("POMES_S3_SECURE_ACCESS", "No"),
            ]),
        )
        .unwrap();

        assert_eq!(config.engines(), &[Engine::Minio]);
        let params = config.params(None).unwrap();
        assert_eq!(params.bucket_name.as_str(), "test-bucket");
        assert_eq!(
            params.endpoint,
            EngineEndpoint::Minio {
                endpoint_url: "localhost:9000".to_string(),
                secure_access: false,
            }
        );
    }

    #[test]
    fn test_engine_list_from_env() {
        let config = config_from_lookup(
            "APP",
            lookup(&[
                ("APP_S3_ENGINES", "aws, minio"),
                ("APP_AWS_ACCESS_KEY", "a"),
                ("APP_AWS_SECRET_KEY", "b"),
                ("APP_AWS_BUCKET_NAME", "aws-bucket"),
                ("APP_AWS_TEMP_FOLDER", "/tmp"),
                ("APP_AWS_REGION_NAME", "sa-east-1"),
                ("APP_MINIO_ACCESS_KEY", "c"),
                ("APP_MINIO_SECRET_KEY", "d"),
                ("APP_MINIO_BUCKET_NAME", "minio-bucket"),
                ("APP_MINIO_TEMP_FOLDER", "/tmp"),
                ("APP_MINIO_ENDPOINT_URL", "minio.local:9000"),
                ("APP_MINIO_SECURE_ACCESS", "on"),
            ]),
        )
        .unwrap();

        assert_eq!(config.engines(), &[Engine::Aws, Engine::Minio]);
        assert_eq!(config.params(None).unwrap().region(), "sa-east-1");
        assert_eq!(
            config.params(Some(Engine::Minio)).unwrap().endpoint_url().as_deref(),
            Some("https://minio.local:9000")
        );
    }

    #[test]
    fn test_missing_variable_is_named() {
        let err = config_from_lookup(
            "POMES",
            lookup(&[
                ("POMES_S3_ENGINE", "aws"),
                ("POMES_S3_ACCESS_KEY", "a"),
                ("POMES_S3_SECRET_KEY", "b"),
                ("POMES_S3_BUCKET_NAME", "bucket"),
                ("POMES_S3_TEMP_FOLDER", "/tmp"),
            ]),
        )
        .unwrap_err();

        assert_eq!(err.to_string(), "Missing environment variable POMES_S3_REGION_NAME");
    }

    #[test]
    fn test_unknown_engine_and_bad_bool() {
        let err = config_from_lookup("POMES", lookup(&[("POMES_S3_ENGINE", "gcs")])).unwrap_err();
        assert!(matches!(err, AppError::InvalidVariable { .. }));

        let err = config_from_lookup(
            "POMES",
            lookup(&[
                ("POMES_S3_ENGINE", "minio"),
                ("POMES_S3_ACCESS_KEY", "a"),
                ("POMES_S3_SECRET_KEY", "b"),
                ("POMES_S3_BUCKET_NAME", "bucket"),
                ("POMES_S3_TEMP_FOLDER", "/tmp"),
                ("POMES_S3_ENDPOINT_URL", "localhost:9000"),
                ("POMES_S3_SECURE_ACCESS", "maybe"),
            ]),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidVariable { name, .. } if name == "POMES_S3_SECURE_ACCESS"));
    }

    #[test]
    fn test_no_engine_variables_is_empty() {
        let config = config_from_lookup("POMES", lookup(&[])).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn test_parse_bool() {
        for value in ["1", "t", "TRUE", "y", "Yes", "on"] {
            assert_eq!(parse_bool(value), Some(true), "{}", value);
        }
        for value in ["0", "f", "False", "n", "NO", "off"] {
            assert_eq!(parse_bool(value), Some(false), "{}", value);
        }
        assert_eq!(parse_bool("2"), None);
    }

    #[tokio::test]
    async fn test_in_memory_app() {
        use crate::ports::services::{S3Service, Scope};

        let app = AppBuilder::new()
            .with_storage_backend(StorageBackend::InMemory)
            .with_engine(AccessParams {
                access_key: "a".to_string(),
                secret_key: "b".to_string(),
                bucket_name: BucketName::new("test-bucket").unwrap(),
                temp_folder: std::env::temp_dir(),
                endpoint: EngineEndpoint::Aws {
                    region: "us-east-1".to_string(),
                },
            })
            .unwrap()
            .build();

        assert_eq!(app.engines(), vec![Engine::Aws]);
        assert!(app.startup(&Scope::default()).await.unwrap());
    }
}
