use crate::domain::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The S3-compatible engines this crate can talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Aws,
    Minio,
}

impl Engine {
    /// Lowercase engine name, as used in configuration and messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Aws => "aws",
            Engine::Minio => "minio",
        }
    }

    /// Tag used in environment variable names when several engines are configured
    pub fn env_tag(&self) -> &'static str {
        match self {
            Engine::Aws => "AWS",
            Engine::Minio => "MINIO",
        }
    }
}

impl FromStr for Engine {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aws" => Ok(Engine::Aws),
            "minio" => Ok(Engine::Minio),
            _ => Err(ValidationError::UnknownEngine(s.to_string())),
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
