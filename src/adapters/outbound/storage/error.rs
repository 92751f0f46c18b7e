use std::fmt::Display;

use tracing::error;

use crate::domain::{
    errors::{sanitize_message, StorageError, ValidationError},
    models::AccessParams,
    value_objects::Engine,
};

/// Engine and endpoint a client talks to, used to render vendor failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    engine: Engine,
    endpoint: String,
}

impl ErrorContext {
    pub fn new(engine: Engine, endpoint: impl Into<String>) -> Self {
        Self {
            engine,
            endpoint: endpoint.into(),
        }
    }

    pub fn for_params(params: &AccessParams) -> Self {
        Self::new(params.engine(), params.endpoint.label())
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    /// Turn a vendor failure into the uniform access error, logging it
    pub fn access_error(&self, err: impl Display) -> StorageError {
        let err = StorageError::Access {
            engine: self.engine,
            endpoint: self.endpoint.clone(),
            message: sanitize_message(&err.to_string()),
        };
        error!("{}", err);
        err
    }
}

/// Whether an object_store failure means the object is absent
pub fn is_not_found(err: &object_store::Error) -> bool {
    matches!(err, object_store::Error::NotFound { .. })
}

impl From<ValidationError> for StorageError {
    fn from(err: ValidationError) -> Self {
        StorageError::Validation(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization {
            message: sanitize_message(&err.to_string()),
        }
    }
}
