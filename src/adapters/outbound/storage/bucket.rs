use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::DisplayErrorContext,
    types::{BucketLocationConstraint, CreateBucketConfiguration},
    Client,
};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    adapters::outbound::storage::error::ErrorContext,
    domain::{
        errors::StorageResult,
        models::{AccessParams, DEFAULT_REGION},
        value_objects::{BucketName, Engine},
    },
};

/// Bucket administration, which the object-level client does not cover
#[async_trait]
pub trait BucketOperations: Send + Sync + 'static {
    /// Check if a bucket exists
    async fn bucket_exists(&self, name: &BucketName) -> StorageResult<bool>;

    /// Create a bucket; an already owned bucket is not an error
    async fn create_bucket(&self, name: &BucketName) -> StorageResult<()>;
}

/// Bucket operations through the AWS SDK S3 client
#[derive(Clone, Debug)]
pub struct SdkBucketOperations {
    client: Client,
    region: String,
    context: ErrorContext,
}

impl SdkBucketOperations {
    /// Build an SDK client from access parameters.
    ///
    /// MinIO endpoints use path-style addressing.
    pub fn from_params(params: &AccessParams) -> Self {
        let credentials = Credentials::new(
            &params.access_key,
            &params.secret_key,
            None,
            None,
            "pomes-s3",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(params.region().to_string()))
            .credentials_provider(credentials);

        if let Some(endpoint_url) = params.endpoint_url() {
            builder = builder.endpoint_url(endpoint_url).force_path_style(true);
        }

        Self {
            client: Client::from_conf(builder.build()),
            region: params.region().to_string(),
            context: ErrorContext::for_params(params),
        }
    }

    fn location_constraint(&self) -> Option<CreateBucketConfiguration> {
        // us-east-1 rejects an explicit constraint, and MinIO ignores it
        if self.context.engine() != Engine::Aws || self.region == DEFAULT_REGION {
            return None;
        }

        Some(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                .build(),
        )
    }
}

#[async_trait]
impl BucketOperations for SdkBucketOperations {
    async fn bucket_exists(&self, name: &BucketName) -> StorageResult<bool> {
        match self.client.head_bucket().bucket(name.as_str()).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                let not_found = e.as_service_error().is_some_and(|se| se.is_not_found())
                    || e.raw_response()
                        .is_some_and(|response| response.status().as_u16() == 404);
                if not_found {
                    Ok(false)
                } else {
                    Err(self.context.access_error(DisplayErrorContext(&e)))
                }
            }
        }
    }

    async fn create_bucket(&self, name: &BucketName) -> StorageResult<()> {
        let request = self
            .client
            .create_bucket()
            .bucket(name.as_str())
            .set_create_bucket_configuration(self.location_constraint());

        match request.send().await {
            Ok(_) => Ok(()),
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(|se| se.is_bucket_already_owned_by_you()) =>
            {
                Ok(())
            }
            Err(e) => Err(self.context.access_error(DisplayErrorContext(&e))),
        }
    }
}

/// Bucket registry for the in-memory backend
#[derive(Clone, Default)]
pub struct InMemoryBucketOperations {
    buckets: Arc<RwLock<HashSet<String>>>,
}

impl InMemoryBucketOperations {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BucketOperations for InMemoryBucketOperations {
    async fn bucket_exists(&self, name: &BucketName) -> StorageResult<bool> {
        Ok(self.buckets.read().await.contains(name.as_str()))
    }

    async fn create_bucket(&self, name: &BucketName) -> StorageResult<()> {
        self.buckets.write().await.insert(name.as_str().to_string());
        Ok(())
    }
}
