pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - configuration, value objects and results
pub use domain::{
    // Models
    AccessParams,
    BucketName,
    BulkRemoval,
    DataRange,
    DomainValidationError,
    // Value objects
    Engine,
    EngineEndpoint,
    ItemInfo,
    ObjectKey,
    ObjectStat,
    ObjectTags,
    S3Config,
    // Errors
    StorageError,
    StorageResult,
};

// Port types - interfaces for engines and the facade
pub use ports::{EngineConnector, S3Client, S3Service, Scope, StorageEngine};

// Service implementations - the facade
pub use services::{S3ServiceImpl, FOLDER_REMOVE_LIMIT};

// Application factory and configuration
pub use app::{
    app_prefix_from_env, config_from_env, config_from_lookup, create_app_from_env,
    create_in_memory_app, AppBuilder, AppConfig, AppError, StorageBackend,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::storage::{InMemoryConnector, ObjectStoreEngine, SdkConnector};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        AccessParams, AppBuilder, BucketName, Engine, EngineEndpoint, ObjectTags, S3Config,
        S3Service, S3ServiceImpl, Scope, StorageBackend, StorageError, StorageResult,
    };
}
