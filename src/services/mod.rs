mod s3_service_impl;

pub use s3_service_impl::{S3ServiceImpl, FOLDER_REMOVE_LIMIT};
