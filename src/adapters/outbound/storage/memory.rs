use async_trait::async_trait;
use object_store::memory::InMemory;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::{
    adapters::outbound::storage::{
        bucket::InMemoryBucketOperations, error::ErrorContext,
        object_store_adapter::ObjectStoreEngine,
    },
    domain::{
        errors::StorageResult,
        models::AccessParams,
        value_objects::{BucketName, Engine},
    },
    ports::storage::{EngineConnector, S3Client},
};

/// Connector serving every engine from process memory.
///
/// Clients opened for the same engine and bucket share their objects.
#[derive(Clone, Default)]
pub struct InMemoryConnector {
    stores: Arc<Mutex<HashMap<(Engine, BucketName), Arc<InMemory>>>>,
    buckets: Arc<InMemoryBucketOperations>,
}

impl InMemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EngineConnector for InMemoryConnector {
    async fn connect(&self, params: &AccessParams, bucket: &BucketName) -> StorageResult<S3Client> {
        let store = {
            let mut stores = self.stores.lock().await;
            Arc::clone(
                stores
                    .entry((params.engine(), bucket.clone()))
                    .or_insert_with(|| Arc::new(InMemory::new())),
            )
        };

        info!("In-memory {} client created for bucket {}", params.engine(), bucket);
        Ok(Arc::new(ObjectStoreEngine::new(
            store,
            Arc::clone(&self.buckets) as _,
            bucket.clone(),
            ErrorContext::for_params(params),
        )))
    }
}
