pub mod access;
pub mod config;
pub mod object;

pub use access::*;
pub use config::S3Config;
pub use object::*;
