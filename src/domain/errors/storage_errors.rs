use crate::domain::errors::ValidationError;
use crate::domain::value_objects::Engine;

/// Errors that can occur during storage operations.
///
/// A vendor "not found" is never one of these: operations report a missing
/// object as an absent result instead.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    /// The requested engine is unknown or has no access parameters
    EngineNotConfigured { engine: String },

    /// Access parameters rejected by `setup`
    InvalidSetup { message: String },

    /// Configuration could not be assembled (environment, client settings)
    Configuration { message: String },

    /// A value object failed validation
    Validation(ValidationError),

    /// The engine failed to carry out an operation
    Access {
        engine: Engine,
        endpoint: String,
        message: String,
    },

    /// A stored object could not be encoded or decoded
    Serialization { message: String },
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::EngineNotConfigured { engine } => {
                write!(f, "S3 engine '{}' unknown or not configured", engine)
            }
            StorageError::InvalidSetup { message } => {
                write!(f, "Invalid S3 setup: {}", message)
            }
            StorageError::Configuration { message } => {
                write!(f, "S3 configuration error: {}", message)
            }
            StorageError::Validation(err) => write!(f, "Validation error: {}", err),
            StorageError::Access {
                engine,
                endpoint,
                message,
            } => {
                write!(
                    f,
                    "Error accessing '{}' at '{}': {}",
                    engine, endpoint, message
                )
            }
            StorageError::Serialization { message } => {
                write!(f, "Serialization error: {}", message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Clean up vendor error text before it lands in an error message.
///
/// Double quotes become single quotes, line breaks and tabs become spaces,
/// backslashes become forward slashes, and whitespace runs collapse.
pub fn sanitize_message(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| match c {
            '"' => '\'',
            '\n' | '\r' | '\t' => ' ',
            '\\' => '/',
            other => other,
        })
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}
