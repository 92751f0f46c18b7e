mod storage_engine;

pub use storage_engine::{EngineConnector, S3Client, StorageEngine};
