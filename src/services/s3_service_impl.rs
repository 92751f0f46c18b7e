use async_trait::async_trait;
use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::{
            AccessParams, BulkRemoval, DataRange, ItemInfo, ObjectStat, ObjectTags, S3Config,
            MIMETYPE_BINARY, MIMETYPE_JSON,
        },
        value_objects::{normalize_prefix, Engine, ObjectKey},
    },
    ports::{
        services::{S3Service, Scope},
        storage::{EngineConnector, S3Client},
    },
};

/// Most items `folder_remove` deletes in one call
pub const FOLDER_REMOVE_LIMIT: usize = 10_000;

/// Facade dispatching the uniform operations to the configured engines
#[derive(Clone)]
pub struct S3ServiceImpl {
    config: S3Config,
    connector: Arc<dyn EngineConnector>,
}

impl S3ServiceImpl {
    /// Create a new S3ServiceImpl instance
    pub fn new(config: S3Config, connector: Arc<dyn EngineConnector>) -> Self {
        Self { config, connector }
    }

    pub fn config(&self) -> &S3Config {
        &self.config
    }

    /// Establish the access parameters for one engine
    pub fn setup(&mut self, params: AccessParams) -> StorageResult<()> {
        let engine = params.engine();
        self.config.setup(params)?;
        info!("Configured engine {}", engine);
        Ok(())
    }

    /// Store any serializable value as a JSON document
    pub async fn object_store<T>(
        &self,
        scope: &Scope,
        prefix: &str,
        identifier: &str,
        value: &T,
        tags: &ObjectTags,
    ) -> StorageResult<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        let data = serde_json::to_vec(value)?;
        self.data_store(
            scope,
            prefix,
            identifier,
            Bytes::from(data),
            Some(MIMETYPE_JSON),
            tags,
        )
        .await
    }

    /// Retrieve a JSON document stored with [`S3ServiceImpl::object_store`]
    pub async fn object_retrieve<T>(
        &self,
        scope: &Scope,
        prefix: &str,
        identifier: &str,
    ) -> StorageResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        match self.data_retrieve(scope, prefix, identifier, None).await? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    /// Resolve the scope to a client: supplied, or opened for engine and bucket
    async fn client(&self, scope: &Scope) -> StorageResult<S3Client> {
        if let Some(client) = &scope.client {
            if let Some(engine) = scope.engine.filter(|engine| *engine != client.engine()) {
                return Err(StorageError::Configuration {
                    message: format!(
                        "client for engine '{}' supplied with engine '{}'",
                        client.engine(),
                        engine
                    ),
                });
            }
            if let Some(bucket) = scope.bucket.as_ref().filter(|b| *b != client.bucket()) {
                return Err(StorageError::Configuration {
                    message: format!(
                        "client for bucket '{}' supplied with bucket '{}'",
                        client.bucket(),
                        bucket
                    ),
                });
            }
            return Ok(Arc::clone(client));
        }

        let engine = self.config.resolve_engine(scope.engine)?;
        let params = self.config.engine_params(engine)?;
        let bucket = scope
            .bucket
            .clone()
            .unwrap_or_else(|| params.bucket_name.clone());

        self.connector.connect(params, &bucket).await
    }

    fn object_key(prefix: &str, identifier: &str) -> StorageResult<ObjectKey> {
        Ok(ObjectKey::from_location(prefix, identifier)?)
    }
}

#[async_trait]
impl S3Service for S3ServiceImpl {
    fn engines(&self) -> Vec<Engine> {
        self.config.engines().to_vec()
    }

    fn params(&self, engine: Option<Engine>) -> Option<&AccessParams> {
        self.config.params(engine)
    }

    async fn access(&self, scope: &Scope) -> StorageResult<S3Client> {
        self.client(scope).await
    }

    async fn assert_access(&self, engine: Option<Engine>) -> StorageResult<()> {
        let client = self.client(&Scope::builder().maybe_engine(engine).build()).await?;
        let exists = client.bucket_exists().await?;

        info!(
            "Accessed {}, bucket {} {}",
            client.engine(),
            client.bucket(),
            if exists { "found" } else { "not found" }
        );
        Ok(())
    }

    async fn startup(&self, scope: &Scope) -> StorageResult<bool> {
        let client = self.client(scope).await?;
        let ready = client.ensure_bucket().await?;

        info!("Started {}, bucket {}", client.engine(), client.bucket());
        Ok(ready)
    }

    async fn data_store(
        &self,
        scope: &Scope,
        prefix: &str,
        identifier: &str,
        data: Bytes,
        mimetype: Option<&str>,
        tags: &ObjectTags,
    ) -> StorageResult<()> {
        let key = Self::object_key(prefix, identifier)?;
        let client = self.client(scope).await?;

        client
            .store_data(&key, data, mimetype.unwrap_or(MIMETYPE_BINARY), tags)
            .await
    }

    async fn data_retrieve(
        &self,
        scope: &Scope,
        prefix: &str,
        identifier: &str,
        range: Option<DataRange>,
    ) -> StorageResult<Option<Bytes>> {
        let key = Self::object_key(prefix, identifier)?;
        let client = self.client(scope).await?;

        client.retrieve_data(&key, range).await
    }

    async fn file_store(
        &self,
        scope: &Scope,
        prefix: &str,
        identifier: &str,
        filepath: &Path,
        mimetype: Option<&str>,
        tags: &ObjectTags,
    ) -> StorageResult<()> {
        let key = Self::object_key(prefix, identifier)?;
        let client = self.client(scope).await?;

        client.store_file(&key, filepath, mimetype, tags).await
    }

    async fn file_retrieve(
        &self,
        scope: &Scope,
        prefix: &str,
        identifier: &str,
        filepath: Option<&Path>,
    ) -> StorageResult<Option<PathBuf>> {
        let key = Self::object_key(prefix, identifier)?;
        let client = self.client(scope).await?;

        let target = match filepath {
            Some(path) => path.to_path_buf(),
            None => self
                .config
                .engine_params(client.engine())?
                .temp_folder
                .join(normalize_prefix(identifier)),
        };

        let written = client.retrieve_file(&key, &target).await?;
        Ok(written.map(|bytes| {
            debug!("Wrote {} bytes to {}", bytes, target.display());
            target
        }))
    }

    async fn object_exists(
        &self,
        scope: &Scope,
        prefix: &str,
        identifier: Option<&str>,
    ) -> StorageResult<bool> {
        match identifier {
            Some(identifier) => Ok(self.item_stat(scope, prefix, identifier).await?.is_some()),
            None => Ok(!self.items_list(scope, prefix, 1).await?.is_empty()),
        }
    }

    async fn item_stat(
        &self,
        scope: &Scope,
        prefix: &str,
        identifier: &str,
    ) -> StorageResult<Option<ObjectStat>> {
        let key = Self::object_key(prefix, identifier)?;
        let client = self.client(scope).await?;

        client.item_stat(&key).await
    }

    async fn item_tags(
        &self,
        scope: &Scope,
        prefix: &str,
        identifier: &str,
    ) -> StorageResult<Option<ObjectTags>> {
        let key = Self::object_key(prefix, identifier)?;
        let client = self.client(scope).await?;

        client.item_tags(&key).await
    }

    async fn item_remove(
        &self,
        scope: &Scope,
        prefix: &str,
        identifier: &str,
    ) -> StorageResult<usize> {
        let key = Self::object_key(prefix, identifier)?;
        let client = self.client(scope).await?;

        client.remove_item(&key).await
    }

    async fn folder_remove(&self, scope: &Scope, prefix: &str) -> StorageResult<BulkRemoval> {
        self.items_remove(scope, prefix, FOLDER_REMOVE_LIMIT).await
    }

    async fn items_remove(
        &self,
        scope: &Scope,
        prefix: &str,
        max_count: usize,
    ) -> StorageResult<BulkRemoval> {
        let client = self.client(scope).await?;
        let removal = client.remove_items(prefix, max_count).await?;

        debug!(
            "Removed {} items under {}, bucket {}",
            removal.removed,
            prefix,
            client.bucket()
        );
        Ok(removal)
    }

    async fn items_list(
        &self,
        scope: &Scope,
        prefix: &str,
        max_count: usize,
    ) -> StorageResult<Vec<ItemInfo>> {
        let client = self.client(scope).await?;

        client.list_items(prefix, max_count).await
    }
}
