mod bucket_name;
mod engine;
mod object_key;

pub use bucket_name::BucketName;
pub use engine::Engine;
pub use object_key::{normalize_prefix, ObjectKey};
