use std::path::PathBuf;

use crate::domain::value_objects::{BucketName, Engine};

/// Region used for MinIO servers, which ignore it but still need one for signing
pub const DEFAULT_REGION: &str = "us-east-1";

/// Engine-specific location of the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEndpoint {
    Aws {
        region: String,
    },
    Minio {
        endpoint_url: String,
        secure_access: bool,
    },
}

impl EngineEndpoint {
    pub fn engine(&self) -> Engine {
        match self {
            EngineEndpoint::Aws { .. } => Engine::Aws,
            EngineEndpoint::Minio { .. } => Engine::Minio,
        }
    }

    /// Where the engine lives, as reported in error messages
    pub fn label(&self) -> &str {
        match self {
            EngineEndpoint::Aws { region } => region,
            EngineEndpoint::Minio { endpoint_url, .. } => endpoint_url,
        }
    }
}

/// Access parameters for one configured engine
#[derive(Clone, PartialEq, Eq)]
pub struct AccessParams {
    pub access_key: String,
    pub secret_key: String,
    pub bucket_name: BucketName,
    pub temp_folder: PathBuf,
    pub endpoint: EngineEndpoint,
}

impl AccessParams {
    pub fn engine(&self) -> Engine {
        self.endpoint.engine()
    }

    /// MinIO endpoint as a URL, with the scheme chosen by the TLS flag when absent
    pub fn endpoint_url(&self) -> Option<String> {
        match &self.endpoint {
            EngineEndpoint::Aws { .. } => None,
            EngineEndpoint::Minio {
                endpoint_url,
                secure_access,
            } => {
                if endpoint_url.starts_with("http://") || endpoint_url.starts_with("https://") {
                    Some(endpoint_url.clone())
                } else {
                    let scheme = if *secure_access { "https" } else { "http" };
                    Some(format!("{}://{}", scheme, endpoint_url))
                }
            }
        }
    }

    pub fn region(&self) -> &str {
        match &self.endpoint {
            EngineEndpoint::Aws { region } => region,
            EngineEndpoint::Minio { .. } => DEFAULT_REGION,
        }
    }
}

impl std::fmt::Debug for AccessParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessParams")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("bucket_name", &self.bucket_name)
            .field("temp_folder", &self.temp_folder)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minio(endpoint_url: &str, secure_access: bool) -> AccessParams {
        AccessParams {
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            bucket_name: BucketName::new("test-bucket").unwrap(),
            temp_folder: PathBuf::from("/tmp"),
            endpoint: EngineEndpoint::Minio {
                endpoint_url: endpoint_url.to_string(),
                secure_access,
            },
        }
    }

    #[test]
    fn test_endpoint_url_scheme() {
        assert_eq!(
            minio("localhost:9000", false).endpoint_url().as_deref(),
            Some("http://localhost:9000")
        );
        assert_eq!(
            minio("play.min.io", true).endpoint_url().as_deref(),
            Some("https://play.min.io")
        );
        assert_eq!(
            minio("http://10.0.0.1:9000", true).endpoint_url().as_deref(),
            Some("http://10.0.0.1:9000")
        );
        assert_eq!(minio("localhost:9000", false).region(), DEFAULT_REGION);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", minio("localhost:9000", false));
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("secret_key: \"minioadmin\""));
    }
}
