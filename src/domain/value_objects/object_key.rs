use crate::domain::errors::ValidationError;
use serde::Serialize;

/// A validated object key (path) in the storage system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Create a new ObjectKey with validation
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.is_empty() {
            return Err(ValidationError::EmptyObjectKey);
        }

        if value.len() > 1024 {
            return Err(ValidationError::ObjectKeyTooLong {
                actual: value.len(),
                max: 1024,
            });
        }

        if value.contains('\0') {
            return Err(ValidationError::InvalidObjectKeyCharacter('\0'));
        }

        if value.starts_with('/') {
            return Err(ValidationError::ObjectKeyStartsWithSlash);
        }

        if value.contains("//") {
            return Err(ValidationError::ObjectKeyContainsDoubleSlash);
        }

        Ok(Self(value))
    }

    /// Build the key addressing `identifier` inside the folder `prefix`.
    ///
    /// Both parts are joined POSIX-style: empty and `.` segments are dropped,
    /// so `("docs/", "a.txt")`, `("/docs", "a.txt")` and `("docs", "./a.txt")`
    /// all yield `docs/a.txt`.
    pub fn from_location(prefix: &str, identifier: &str) -> Result<Self, ValidationError> {
        Self::new(normalize_prefix(&format!("{}/{}", prefix, identifier)))
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Normalize a folder prefix the same way keys are joined
pub fn normalize_prefix(prefix: &str) -> String {
    prefix
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
