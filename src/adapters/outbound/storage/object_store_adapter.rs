use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::{
    buffered::BufWriter, path::Path as ObjectPath, Attribute, AttributeValue, Attributes,
    GetOptions, GetRange, ObjectStore as ObjectStoreBackend, PutOptions, PutPayload,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio_util::io::StreamReader;
use tracing::debug;

use crate::{
    adapters::outbound::storage::{
        bucket::BucketOperations,
        error::{is_not_found, ErrorContext},
    },
    domain::{
        errors::{StorageError, StorageResult, ValidationError},
        models::{normalize_tags, DataRange, ItemInfo, ObjectStat, ObjectTags},
        value_objects::{normalize_prefix, BucketName, Engine, ObjectKey},
    },
    ports::storage::StorageEngine,
};

/// Storage engine backed by an `object_store` client bound to one bucket.
///
/// Both the AWS and MinIO engines are this adapter over differently
/// configured S3 stores; tests run it over `InMemory`.
pub struct ObjectStoreEngine {
    store: Arc<dyn ObjectStoreBackend>,
    buckets: Arc<dyn BucketOperations>,
    bucket: BucketName,
    context: ErrorContext,
}

impl ObjectStoreEngine {
    pub fn new(
        store: Arc<dyn ObjectStoreBackend>,
        buckets: Arc<dyn BucketOperations>,
        bucket: BucketName,
        context: ErrorContext,
    ) -> Self {
        Self {
            store,
            buckets,
            bucket,
            context,
        }
    }

    /// Store path holding exactly the key's characters, without percent-encoding
    fn to_object_path(key: &ObjectKey) -> StorageResult<ObjectPath> {
        Self::parse_path(key.as_str())
    }

    fn to_prefix_path(prefix: &str) -> StorageResult<Option<ObjectPath>> {
        let prefix = normalize_prefix(prefix);
        if prefix.is_empty() {
            return Ok(None);
        }
        Self::parse_path(&prefix).map(Some)
    }

    fn parse_path(raw: &str) -> StorageResult<ObjectPath> {
        ObjectPath::parse(raw).map_err(|e| {
            StorageError::Validation(ValidationError::InvalidField {
                field: "key".to_string(),
                value: raw.to_string(),
                expected: format!("a valid object path ({})", e),
            })
        })
    }

    fn to_get_range(range: DataRange) -> GetRange {
        match range.end_exclusive() {
            Some(end) => GetRange::Bounded(range.begin()..end),
            None => GetRange::Offset(range.begin()),
        }
    }

    fn to_attributes(mimetype: Option<&str>, tags: &ObjectTags) -> Attributes {
        let mut attributes = Attributes::new();
        if let Some(mimetype) = mimetype {
            attributes.insert(
                Attribute::ContentType,
                AttributeValue::from(mimetype.to_string()),
            );
        }
        for (name, value) in normalize_tags(tags) {
            attributes.insert(Attribute::Metadata(name.into()), AttributeValue::from(value));
        }
        attributes
    }

    fn tags_of(attributes: &Attributes) -> ObjectTags {
        attributes
            .iter()
            .filter_map(|(attribute, value)| match attribute {
                Attribute::Metadata(name) => {
                    let value: &str = value.as_ref();
                    Some((name.to_ascii_lowercase(), value.to_string()))
                }
                _ => None,
            })
            .collect()
    }

    fn content_type_of(attributes: &Attributes) -> Option<String> {
        attributes.get(&Attribute::ContentType).map(|value| {
            let value: &str = value.as_ref();
            value.to_string()
        })
    }

    /// HEAD the object, mapping "not found" to `None`
    async fn head(&self, key: &ObjectKey) -> StorageResult<Option<object_store::GetResult>> {
        let options = GetOptions {
            head: true,
            ..Default::default()
        };

        match self.store.get_opts(&Self::to_object_path(key)?, options).await {
            Ok(result) => Ok(Some(result)),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(self.context.access_error(e)),
        }
    }

    async fn download(
        result: object_store::GetResult,
        filepath: &Path,
        partial: &Path,
    ) -> std::io::Result<u64> {
        if let Some(parent) = filepath.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut reader = StreamReader::new(result.into_stream().map_err(std::io::Error::from));
        let mut file = tokio::fs::File::create(partial).await?;
        let written = tokio::io::copy(&mut reader, &mut file).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(partial, filepath).await?;
        Ok(written)
    }
}

/// Sibling path a download is written to before being renamed into place
fn partial_path(filepath: &Path) -> PathBuf {
    let mut name = filepath
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.part", uuid::Uuid::new_v4().simple()));
    filepath.with_file_name(name)
}

#[async_trait]
impl StorageEngine for ObjectStoreEngine {
    fn engine(&self) -> Engine {
        self.context.engine()
    }

    fn bucket(&self) -> &BucketName {
        &self.bucket
    }

    async fn bucket_exists(&self) -> StorageResult<bool> {
        self.buckets.bucket_exists(&self.bucket).await
    }

    async fn ensure_bucket(&self) -> StorageResult<bool> {
        if !self.buckets.bucket_exists(&self.bucket).await? {
            self.buckets.create_bucket(&self.bucket).await?;
            debug!("Created bucket {} on {}", self.bucket, self.engine());
        }
        Ok(true)
    }

    async fn retrieve_data(
        &self,
        key: &ObjectKey,
        range: Option<DataRange>,
    ) -> StorageResult<Option<Bytes>> {
        let options = GetOptions {
            range: range.map(Self::to_get_range),
            ..Default::default()
        };

        let result = match self.store.get_opts(&Self::to_object_path(key)?, options).await {
            Ok(result) => result,
            Err(e) if is_not_found(&e) => return Ok(None),
            Err(e) => return Err(self.context.access_error(e)),
        };

        let bytes = result
            .bytes()
            .await
            .map_err(|e| self.context.access_error(e))?;

        debug!("Retrieved {}, bucket {}", key, self.bucket);
        Ok(Some(bytes))
    }

    async fn store_data(
        &self,
        key: &ObjectKey,
        data: Bytes,
        mimetype: &str,
        tags: &ObjectTags,
    ) -> StorageResult<()> {
        let options = PutOptions {
            attributes: Self::to_attributes(Some(mimetype), tags),
            ..Default::default()
        };

        self.store
            .put_opts(&Self::to_object_path(key)?, PutPayload::from(data), options)
            .await
            .map_err(|e| self.context.access_error(e))?;

        debug!(
            "Stored {}, bucket {}, content type {}, tags {:?}",
            key, self.bucket, mimetype, tags
        );
        Ok(())
    }

    async fn retrieve_file(&self, key: &ObjectKey, filepath: &Path) -> StorageResult<Option<u64>> {
        let result = match self.store.get(&Self::to_object_path(key)?).await {
            Ok(result) => result,
            Err(e) if is_not_found(&e) => return Ok(None),
            Err(e) => return Err(self.context.access_error(e)),
        };

        let partial = partial_path(filepath);
        match Self::download(result, filepath, &partial).await {
            Ok(written) => {
                debug!(
                    "Retrieved {}, bucket {}, to {}",
                    key,
                    self.bucket,
                    filepath.display()
                );
                Ok(Some(written))
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                Err(self.context.access_error(e))
            }
        }
    }

    async fn store_file(
        &self,
        key: &ObjectKey,
        filepath: &Path,
        mimetype: Option<&str>,
        tags: &ObjectTags,
    ) -> StorageResult<()> {
        let path = Self::to_object_path(key)?;
        let mut file = tokio::fs::File::open(filepath)
            .await
            .map_err(|e| self.context.access_error(e))?;

        let mut writer = BufWriter::new(Arc::clone(&self.store), path)
            .with_attributes(Self::to_attributes(mimetype, tags));

        let copied = tokio::io::copy(&mut file, &mut writer).await;
        let outcome = match copied {
            Ok(_) => writer.shutdown().await,
            Err(e) => Err(e),
        };

        if let Err(e) = outcome {
            let _ = writer.abort().await;
            return Err(self.context.access_error(e));
        }

        debug!(
            "Stored {}, bucket {}, from {}, content type {:?}, tags {:?}",
            key,
            self.bucket,
            filepath.display(),
            mimetype,
            tags
        );
        Ok(())
    }

    async fn item_stat(&self, key: &ObjectKey) -> StorageResult<Option<ObjectStat>> {
        let Some(result) = self.head(key).await? else {
            return Ok(None);
        };

        debug!("Got info for {}, bucket {}", key, self.bucket);
        Ok(Some(ObjectStat {
            key: key.clone(),
            size: result.meta.size,
            etag: result.meta.e_tag.clone(),
            version_id: result.meta.version.clone(),
            last_modified: result.meta.last_modified,
            content_type: Self::content_type_of(&result.attributes),
        }))
    }

    async fn item_tags(&self, key: &ObjectKey) -> StorageResult<Option<ObjectTags>> {
        let Some(result) = self.head(key).await? else {
            return Ok(None);
        };

        let tags = Self::tags_of(&result.attributes);
        debug!("Retrieved {}, bucket {}, tags {:?}", key, self.bucket, tags);
        Ok(Some(tags))
    }

    /// Walks the prefix folder by folder so folder markers can be told apart from
    /// empty objects: S3 reports a `folder/` marker as a common prefix of its
    /// parent, and as a zero-byte object named after the folder inside it.
    async fn list_items(&self, prefix: &str, max_count: usize) -> StorageResult<Vec<ItemInfo>> {
        let mut items = Vec::new();
        if max_count == 0 {
            return Ok(items);
        }

        let mut pending = vec![Self::to_prefix_path(prefix)?];
        'walk: while let Some(folder) = pending.pop() {
            let listing = match self.store.list_with_delimiter(folder.as_ref()).await {
                Ok(listing) => listing,
                Err(e) if is_not_found(&e) => continue,
                Err(e) => return Err(self.context.access_error(e)),
            };

            for meta in listing.objects {
                let is_marker = meta.size == 0
                    && (folder.as_ref() == Some(&meta.location)
                        || listing.common_prefixes.contains(&meta.location));
                if is_marker {
                    continue;
                }

                let key = ObjectKey::new(meta.location.as_ref()).map_err(StorageError::from)?;
                items.push(ItemInfo {
                    key,
                    size: meta.size,
                    etag: meta.e_tag,
                    last_modified: meta.last_modified,
                });

                if items.len() >= max_count {
                    break 'walk;
                }
            }

            // Visit subfolders in key order
            pending.extend(listing.common_prefixes.into_iter().rev().map(Some));
        }

        debug!("Listed {}, bucket {}", prefix, self.bucket);
        Ok(items)
    }

    async fn remove_item(&self, key: &ObjectKey) -> StorageResult<usize> {
        // S3 deletes succeed for missing keys, so probe first
        if self.head(key).await?.is_none() {
            return Ok(0);
        }

        match self.store.delete(&Self::to_object_path(key)?).await {
            Ok(()) => {
                debug!("Deleted {}, bucket {}", key, self.bucket);
                Ok(1)
            }
            Err(e) if is_not_found(&e) => Ok(0),
            Err(e) => Err(self.context.access_error(e)),
        }
    }
}
