use async_trait::async_trait;
use bytes::Bytes;
use object_store::memory::InMemory;
use pomes_s3::{
    adapters::outbound::storage::{ErrorContext, InMemoryBucketOperations, ObjectStoreEngine},
    AccessParams, BucketName, DataRange, Engine, EngineEndpoint, ItemInfo, ObjectKey, ObjectStat,
    ObjectTags, S3Client, S3Config, S3Service, Scope, StorageEngine, StorageError, StorageResult,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

fn config(temp_folder: &Path) -> S3Config {
    let mut config = S3Config::new();
    config
        .setup(AccessParams {
            access_key: "access".to_string(),
            secret_key: "secret".to_string(),
            bucket_name: BucketName::new("test-bucket").unwrap(),
            temp_folder: temp_folder.to_path_buf(),
            endpoint: EngineEndpoint::Aws {
                region: "us-east-1".to_string(),
            },
        })
        .unwrap();
    config
        .setup(AccessParams {
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            bucket_name: BucketName::new("minio-bucket").unwrap(),
            temp_folder: temp_folder.to_path_buf(),
            endpoint: EngineEndpoint::Minio {
                endpoint_url: "localhost:9000".to_string(),
                secure_access: false,
            },
        })
        .unwrap();
    config
}

#[tokio::test]
async fn example_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let app = pomes_s3::create_in_memory_app(config(dir.path()));
    let scope = Scope::for_engine(Engine::Aws);

    app.data_store(&scope, "docs", "a.txt", Bytes::from("hello"), None, &ObjectTags::new())
        .await
        .unwrap();

    let data = app.data_retrieve(&scope, "docs", "a.txt", None).await.unwrap();
    assert_eq!(data, Some(Bytes::from("hello")));

    let partial = app
        .data_retrieve(&scope, "docs", "a.txt", Some(DataRange::new(1, 3).unwrap()))
        .await
        .unwrap();
    assert_eq!(partial, Some(Bytes::from("ell")));
}

#[tokio::test]
async fn engines_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let app = pomes_s3::create_in_memory_app(config(dir.path()));

    app.data_store(
        &Scope::for_engine(Engine::Minio),
        "docs",
        "only-minio.txt",
        Bytes::from("m"),
        None,
        &ObjectTags::new(),
    )
    .await
    .unwrap();

    assert!(app
        .object_exists(&Scope::for_engine(Engine::Minio), "docs", Some("only-minio.txt"))
        .await
        .unwrap());
    assert!(!app
        .object_exists(&Scope::default(), "docs", Some("only-minio.txt"))
        .await
        .unwrap());
    assert_eq!(app.engines(), vec![Engine::Aws, Engine::Minio]);
    assert_eq!(
        app.params(Some(Engine::Minio)).unwrap().bucket_name.as_str(),
        "minio-bucket"
    );
}

#[tokio::test]
async fn file_round_trip_defaults_to_temp_folder() {
    let dir = tempfile::tempdir().unwrap();
    let app = pomes_s3::create_in_memory_app(config(dir.path()));
    let scope = Scope::default();

    let source = dir.path().join("upload.bin");
    tokio::fs::write(&source, vec![7u8; 64 * 1024]).await.unwrap();

    app.file_store(&scope, "files", "payload.bin", &source, None, &ObjectTags::new())
        .await
        .unwrap();

    let target = app
        .file_retrieve(&scope, "files", "payload.bin", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(target, dir.path().join("payload.bin"));
    assert_eq!(tokio::fs::read(&target).await.unwrap(), vec![7u8; 64 * 1024]);

    let explicit = dir.path().join("out/copy.bin");
    let written = app
        .file_retrieve(&scope, "files", "payload.bin", Some(&explicit))
        .await
        .unwrap();
    assert_eq!(written.as_deref(), Some(explicit.as_path()));

    let missing = app
        .file_retrieve(&scope, "files", "absent.bin", None)
        .await
        .unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn json_objects_round_trip() {
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Settings {
        retries: u32,
        hosts: Vec<String>,
    }

    let dir = tempfile::tempdir().unwrap();
    let app = pomes_s3::create_in_memory_app(config(dir.path()));
    let scope = Scope::default();
    let settings = Settings {
        retries: 3,
        hosts: vec!["a".to_string(), "b".to_string()],
    };

    app.object_store(&scope, "settings", "prod.json", &settings, &ObjectTags::new())
        .await
        .unwrap();
    let stored: Option<Settings> = app
        .object_retrieve(&scope, "settings", "prod.json")
        .await
        .unwrap();
    assert_eq!(stored, Some(settings));

    app.data_store(&scope, "settings", "bad.json", Bytes::from("not json"), None, &ObjectTags::new())
        .await
        .unwrap();
    let err = app
        .object_retrieve::<Settings>(&scope, "settings", "bad.json")
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Serialization { .. }));
}

#[tokio::test]
async fn startup_creates_explicit_bucket() {
    let dir = tempfile::tempdir().unwrap();
    let app = pomes_s3::create_in_memory_app(config(dir.path()));
    let scope = Scope::builder()
        .engine(Engine::Minio)
        .bucket(BucketName::new("fresh-bucket").unwrap())
        .build();

    let client = app.access(&scope).await.unwrap();
    assert_eq!(client.bucket().as_str(), "fresh-bucket");
    assert!(!client.bucket_exists().await.unwrap());

    assert!(app.startup(&scope).await.unwrap());
    assert!(client.bucket_exists().await.unwrap());
    app.assert_access(Some(Engine::Minio)).await.unwrap();
}

/// Engine whose deletes fail for keys containing "locked"
struct LockedEngine {
    inner: ObjectStoreEngine,
}

#[async_trait]
impl StorageEngine for LockedEngine {
    fn engine(&self) -> Engine {
        self.inner.engine()
    }

    fn bucket(&self) -> &BucketName {
        self.inner.bucket()
    }

    async fn bucket_exists(&self) -> StorageResult<bool> {
        self.inner.bucket_exists().await
    }

    async fn ensure_bucket(&self) -> StorageResult<bool> {
        self.inner.ensure_bucket().await
    }

    async fn retrieve_data(
        &self,
        key: &ObjectKey,
        range: Option<DataRange>,
    ) -> StorageResult<Option<Bytes>> {
        self.inner.retrieve_data(key, range).await
    }

    async fn store_data(
        &self,
        key: &ObjectKey,
        data: Bytes,
        mimetype: &str,
        tags: &ObjectTags,
    ) -> StorageResult<()> {
        self.inner.store_data(key, data, mimetype, tags).await
    }

    async fn retrieve_file(&self, key: &ObjectKey, filepath: &Path) -> StorageResult<Option<u64>> {
        self.inner.retrieve_file(key, filepath).await
    }

    async fn store_file(
        &self,
        key: &ObjectKey,
        filepath: &Path,
        mimetype: Option<&str>,
        tags: &ObjectTags,
    ) -> StorageResult<()> {
        self.inner.store_file(key, filepath, mimetype, tags).await
    }

    async fn item_stat(&self, key: &ObjectKey) -> StorageResult<Option<ObjectStat>> {
        self.inner.item_stat(key).await
    }

    async fn item_tags(&self, key: &ObjectKey) -> StorageResult<Option<ObjectTags>> {
        self.inner.item_tags(key).await
    }

    async fn list_items(&self, prefix: &str, max_count: usize) -> StorageResult<Vec<ItemInfo>> {
        self.inner.list_items(prefix, max_count).await
    }

    async fn remove_item(&self, key: &ObjectKey) -> StorageResult<usize> {
        if key.as_str().contains("locked") {
            return Err(StorageError::Access {
                engine: self.engine(),
                endpoint: "us-east-1".to_string(),
                message: "AccessDenied".to_string(),
            });
        }
        self.inner.remove_item(key).await
    }
}

#[tokio::test]
async fn bulk_removal_aborts_on_first_failure() {
    let dir = tempfile::tempdir().unwrap();
    let app = pomes_s3::create_in_memory_app(config(dir.path()));

    let client: S3Client = Arc::new(LockedEngine {
        inner: ObjectStoreEngine::new(
            Arc::new(InMemory::new()),
            Arc::new(InMemoryBucketOperations::new()),
            BucketName::new("test-bucket").unwrap(),
            ErrorContext::new(Engine::Aws, "us-east-1"),
        ),
    });
    let scope = Scope::builder().client(client).build();

    // Listing order is lexicographic, so "b-locked" is the third delete
    for name in ["a-1", "a-2", "b-locked", "c-1"] {
        app.data_store(&scope, "jobs", name, Bytes::from("x"), None, &ObjectTags::new())
            .await
            .unwrap();
    }

    let removal = app.items_remove(&scope, "jobs", 10).await.unwrap();
    assert_eq!(removal.removed, 2);
    assert!(!removal.is_complete());
    assert_eq!(
        removal.aborted.unwrap().to_string(),
        "Error accessing 'aws' at 'us-east-1': AccessDenied"
    );

    let left: Vec<String> = app
        .items_list(&scope, "jobs", 10)
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.key.to_string())
        .collect();
    assert_eq!(left, vec!["jobs/b-locked", "jobs/c-1"]);
}

#[tokio::test]
async fn nested_identifier_downloads_below_temp_folder() {
    let dir = tempfile::tempdir().unwrap();
    let app = pomes_s3::create_in_memory_app(config(dir.path()));
    let scope = Scope::default();

    app.data_store(&scope, "exports", "2024/q1.csv", Bytes::from("a,b"), None, &ObjectTags::new())
        .await
        .unwrap();

    let target = app
        .file_retrieve(&scope, "exports", "2024/q1.csv", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(target, dir.path().join("2024").join("q1.csv"));
    assert_eq!(tokio::fs::read(&target).await.unwrap(), b"a,b");
}

#[tokio::test]
async fn special_characters_survive_list_and_bulk_removal() {
    let dir = tempfile::tempdir().unwrap();
    let app = pomes_s3::create_in_memory_app(config(dir.path()));
    let scope = Scope::default();

    app.data_store(&scope, "docs", "report~1#v2.txt", Bytes::from("v2"), None, &ObjectTags::new())
        .await
        .unwrap();

    let keys: Vec<String> = app
        .items_list(&scope, "docs", 10)
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.key.to_string())
        .collect();
    assert_eq!(keys, vec!["docs/report~1#v2.txt"]);

    let removal = app.items_remove(&scope, "docs", 10).await.unwrap();
    assert_eq!(removal.removed, 1);
    assert!(!app.object_exists(&scope, "docs", Some("report~1#v2.txt")).await.unwrap());
}
