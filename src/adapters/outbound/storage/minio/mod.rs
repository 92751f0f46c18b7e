//! MinIO engine, spoken to as a path-style S3 endpoint

use object_store::{aws::AmazonS3Builder, ObjectStore as ObjectStoreBackend};
use std::sync::Arc;
use tracing::info;

use crate::{
    adapters::outbound::storage::{
        bucket::SdkBucketOperations, error::ErrorContext, object_store_adapter::ObjectStoreEngine,
    },
    domain::{
        errors::{StorageError, StorageResult},
        models::{AccessParams, EngineEndpoint},
        value_objects::BucketName,
    },
    ports::storage::S3Client,
};

/// Create a MinIO store for `bucket`
pub fn create_minio_store(
    params: &AccessParams,
    bucket: &BucketName,
) -> StorageResult<Arc<dyn ObjectStoreBackend>> {
    let EngineEndpoint::Minio { secure_access, .. } = &params.endpoint else {
        return Err(StorageError::InvalidSetup {
            message: format!("engine '{}' is not minio", params.engine()),
        });
    };
    let endpoint_url = params
        .endpoint_url()
        .ok_or_else(|| StorageError::InvalidSetup {
            message: "missing endpoint url for engine 'minio'".to_string(),
        })?;
    let context = ErrorContext::for_params(params);

    let store = AmazonS3Builder::new()
        .with_bucket_name(bucket.as_str())
        .with_endpoint(endpoint_url)
        .with_region(params.region())
        .with_access_key_id(&params.access_key)
        .with_secret_access_key(&params.secret_key)
        .with_allow_http(!secure_access)
        .with_virtual_hosted_style_request(false)
        .build()
        .map_err(|e| context.access_error(e))?;

    Ok(Arc::new(store))
}

/// Open a MinIO client bound to `bucket`
pub fn connect_minio(params: &AccessParams, bucket: &BucketName) -> StorageResult<S3Client> {
    let store = create_minio_store(params, bucket)?;
    let buckets = Arc::new(SdkBucketOperations::from_params(params));

    info!(
        "Minio client created for bucket {} at {}",
        bucket,
        params.endpoint.label()
    );
    Ok(Arc::new(ObjectStoreEngine::new(
        store,
        buckets,
        bucket.clone(),
        ErrorContext::for_params(params),
    )))
}
