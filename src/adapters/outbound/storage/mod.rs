// Infrastructure error handling
pub mod error;

// Engine-independent pieces
pub mod bucket;
pub mod connector;
pub mod memory;
pub mod object_store_adapter;

// Engine-specific clients
pub mod aws;
pub mod minio;

pub use bucket::{BucketOperations, InMemoryBucketOperations, SdkBucketOperations};
pub use connector::SdkConnector;
pub use error::ErrorContext;
pub use memory::InMemoryConnector;
pub use object_store_adapter::ObjectStoreEngine;
