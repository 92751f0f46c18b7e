use async_trait::async_trait;
use bon::Builder;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::{
    domain::{
        errors::StorageResult,
        models::{AccessParams, BulkRemoval, DataRange, ItemInfo, ObjectStat, ObjectTags},
        value_objects::{BucketName, Engine},
    },
    ports::storage::S3Client,
};

/// Per-call selection of engine, bucket and client.
///
/// Every member is optional: the engine falls back to the first configured
/// one, the bucket to the engine's configured bucket, and a supplied client
/// is used as is.
#[derive(Clone, Default, Builder)]
pub struct Scope {
    pub engine: Option<Engine>,
    pub bucket: Option<BucketName>,
    pub client: Option<S3Client>,
}

impl Scope {
    /// Scope selecting only an engine
    pub fn for_engine(engine: Engine) -> Self {
        Self {
            engine: Some(engine),
            ..Default::default()
        }
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("engine", &self.engine)
            .field("bucket", &self.bucket)
            .field(
                "client",
                &self
                    .client
                    .as_ref()
                    .map(|client| format!("{}/{}", client.engine(), client.bucket())),
            )
            .finish()
    }
}

/// Port for the uniform storage operations, whichever engine serves them.
///
/// Objects are addressed by a `(prefix, identifier)` pair joined into a key.
#[async_trait]
pub trait S3Service: Send + Sync + 'static {
    /// Configured engines, default first
    fn engines(&self) -> Vec<Engine>;

    /// Access parameters of `engine`, or of the default engine
    fn params(&self, engine: Option<Engine>) -> Option<&AccessParams>;

    /// Open a client for the scope, or return the supplied one
    async fn access(&self, scope: &Scope) -> StorageResult<S3Client>;

    /// Check that the engine's service answers a bucket probe
    async fn assert_access(&self, engine: Option<Engine>) -> StorageResult<()>;

    /// Verify the bucket exists, creating it when missing
    async fn startup(&self, scope: &Scope) -> StorageResult<bool>;

    /// Store bytes, as `application/octet-stream` unless a mimetype is given
    async fn data_store(
        &self,
        scope: &Scope,
        prefix: &str,
        identifier: &str,
        data: Bytes,
        mimetype: Option<&str>,
        tags: &ObjectTags,
    ) -> StorageResult<()>;

    /// Retrieve bytes, optionally a byte range
    async fn data_retrieve(
        &self,
        scope: &Scope,
        prefix: &str,
        identifier: &str,
        range: Option<DataRange>,
    ) -> StorageResult<Option<Bytes>>;

    /// Upload a local file
    async fn file_store(
        &self,
        scope: &Scope,
        prefix: &str,
        identifier: &str,
        filepath: &Path,
        mimetype: Option<&str>,
        tags: &ObjectTags,
    ) -> StorageResult<()>;

    /// Download into `filepath`, or into the engine's temp folder when `None`
    async fn file_retrieve(
        &self,
        scope: &Scope,
        prefix: &str,
        identifier: &str,
        filepath: Option<&Path>,
    ) -> StorageResult<Option<PathBuf>>;

    /// Whether the object exists; without an identifier, whether anything exists under the prefix
    async fn object_exists(
        &self,
        scope: &Scope,
        prefix: &str,
        identifier: Option<&str>,
    ) -> StorageResult<bool>;

    async fn item_stat(
        &self,
        scope: &Scope,
        prefix: &str,
        identifier: &str,
    ) -> StorageResult<Option<ObjectStat>>;

    async fn item_tags(
        &self,
        scope: &Scope,
        prefix: &str,
        identifier: &str,
    ) -> StorageResult<Option<ObjectTags>>;

    /// Remove one object, returning how many were removed (0 or 1)
    async fn item_remove(&self, scope: &Scope, prefix: &str, identifier: &str)
        -> StorageResult<usize>;

    /// Remove everything under the prefix, up to a fixed cap
    async fn folder_remove(&self, scope: &Scope, prefix: &str) -> StorageResult<BulkRemoval>;

    /// Remove up to `max_count` objects under the prefix
    async fn items_remove(
        &self,
        scope: &Scope,
        prefix: &str,
        max_count: usize,
    ) -> StorageResult<BulkRemoval>;

    /// List up to `max_count` objects under the prefix
    async fn items_list(
        &self,
        scope: &Scope,
        prefix: &str,
        max_count: usize,
    ) -> StorageResult<Vec<ItemInfo>>;
}
