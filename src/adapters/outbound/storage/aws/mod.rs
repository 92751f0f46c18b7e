//! AWS S3 engine
//!
//! Objects go through the `object_store` S3 client, bucket administration
//! through the AWS SDK.

use object_store::{aws::AmazonS3Builder, ObjectStore as ObjectStoreBackend};
use std::sync::Arc;
use tracing::info;

use crate::{
    adapters::outbound::storage::{
        bucket::SdkBucketOperations, error::ErrorContext, object_store_adapter::ObjectStoreEngine,
    },
    domain::{
        errors::StorageResult,
        models::AccessParams,
        value_objects::BucketName,
    },
    ports::storage::S3Client,
};

/// Create an AWS S3 store for `bucket` in the configured region
pub fn create_aws_store(
    params: &AccessParams,
    bucket: &BucketName,
) -> StorageResult<Arc<dyn ObjectStoreBackend>> {
    let context = ErrorContext::for_params(params);

    let store = AmazonS3Builder::new()
        .with_bucket_name(bucket.as_str())
        .with_region(params.region())
        .with_access_key_id(&params.access_key)
        .with_secret_access_key(&params.secret_key)
        .build()
        .map_err(|e| context.access_error(e))?;

    Ok(Arc::new(store))
}

/// Open an AWS client bound to `bucket`
pub fn connect_aws(params: &AccessParams, bucket: &BucketName) -> StorageResult<S3Client> {
    let store = create_aws_store(params, bucket)?;
    let buckets = Arc::new(SdkBucketOperations::from_params(params));

    info!(
        "AWS client created for bucket {} in region {}",
        bucket,
        params.region()
    );
    Ok(Arc::new(ObjectStoreEngine::new(
        store,
        buckets,
        bucket.clone(),
        ErrorContext::for_params(params),
    )))
}
