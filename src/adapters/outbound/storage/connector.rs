use async_trait::async_trait;

use crate::{
    adapters::outbound::storage::{aws::connect_aws, minio::connect_minio},
    domain::{
        errors::StorageResult,
        models::AccessParams,
        value_objects::{BucketName, Engine},
    },
    ports::storage::{EngineConnector, S3Client},
};

/// Connector for the real services, choosing the engine from the parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct SdkConnector;

#[async_trait]
impl EngineConnector for SdkConnector {
    async fn connect(&self, params: &AccessParams, bucket: &BucketName) -> StorageResult<S3Client> {
        match params.engine() {
            Engine::Aws => connect_aws(params, bucket),
            Engine::Minio => connect_minio(params, bucket),
        }
    }
}
