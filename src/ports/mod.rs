pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use services::{S3Service, Scope};
pub use storage::{EngineConnector, S3Client, StorageEngine};
