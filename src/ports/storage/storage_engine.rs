use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

use crate::domain::{
    errors::StorageResult,
    models::{AccessParams, BulkRemoval, DataRange, ItemInfo, ObjectStat, ObjectTags},
    value_objects::{BucketName, Engine, ObjectKey},
};

/// Port for the operations one engine performs against one bucket.
///
/// A vendor "not found" is reported as an absent value (`None`, `false`,
/// `0`, empty list). Every other failure is a `StorageError::Access`.
#[async_trait]
pub trait StorageEngine: Send + Sync + 'static {
    /// Engine behind this client
    fn engine(&self) -> Engine;

    /// Bucket this client is bound to
    fn bucket(&self) -> &BucketName;

    /// Check whether the bucket exists, without creating it
    async fn bucket_exists(&self) -> StorageResult<bool>;

    /// Make sure the bucket exists, creating it when missing.
    ///
    /// Returns `true` once the bucket is known to exist.
    async fn ensure_bucket(&self) -> StorageResult<bool>;

    /// Retrieve the object's bytes, optionally restricted to a byte range
    async fn retrieve_data(
        &self,
        key: &ObjectKey,
        range: Option<DataRange>,
    ) -> StorageResult<Option<Bytes>>;

    /// Store bytes with a content type and metadata tags
    async fn store_data(
        &self,
        key: &ObjectKey,
        data: Bytes,
        mimetype: &str,
        tags: &ObjectTags,
    ) -> StorageResult<()>;

    /// Download the object into `filepath`, returning the number of bytes written
    async fn retrieve_file(&self, key: &ObjectKey, filepath: &Path) -> StorageResult<Option<u64>>;

    /// Upload the file at `filepath`
    async fn store_file(
        &self,
        key: &ObjectKey,
        filepath: &Path,
        mimetype: Option<&str>,
        tags: &ObjectTags,
    ) -> StorageResult<()>;

    /// Attributes of the object
    async fn item_stat(&self, key: &ObjectKey) -> StorageResult<Option<ObjectStat>>;

    /// User metadata tags of the object
    async fn item_tags(&self, key: &ObjectKey) -> StorageResult<Option<ObjectTags>>;

    /// Up to `max_count` objects under `prefix`, folder markers excluded
    async fn list_items(&self, prefix: &str, max_count: usize) -> StorageResult<Vec<ItemInfo>>;

    /// Delete one object, returning 1 if it was removed and 0 if it did not exist
    async fn remove_item(&self, key: &ObjectKey) -> StorageResult<usize>;

    /// Delete up to `max_count` objects under `prefix`, one at a time.
    ///
    /// Stops at the first failing delete. A failing listing is an error.
    async fn remove_items(&self, prefix: &str, max_count: usize) -> StorageResult<BulkRemoval> {
        let items = self.list_items(prefix, max_count).await?;

        let mut removal = BulkRemoval::default();
        for item in items {
            if removal.removed >= max_count {
                break;
            }
            match self.remove_item(&item.key).await {
                Ok(count) => removal.removed += count,
                Err(e) => {
                    warn!(
                        "Removal under {} aborted after {} items: {}",
                        prefix, removal.removed, e
                    );
                    removal.aborted = Some(e);
                    break;
                }
            }
        }

        Ok(removal)
    }
}

/// Client handle: an engine connection bound to one bucket
pub type S3Client = Arc<dyn StorageEngine>;

/// Port for opening clients
#[async_trait]
pub trait EngineConnector: Send + Sync + 'static {
    /// Open a client for the engine described by `params`, bound to `bucket`
    async fn connect(&self, params: &AccessParams, bucket: &BucketName) -> StorageResult<S3Client>;
}
