use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::{
    errors::{StorageError, ValidationError},
    value_objects::ObjectKey,
};

/// MIME type used when the caller does not declare one
pub const MIMETYPE_BINARY: &str = "application/octet-stream";

/// MIME type of serialized objects
pub const MIMETYPE_JSON: &str = "application/json";

/// User metadata attached to an object
pub type ObjectTags = BTreeMap<String, String>;

/// Normalize tags the way S3 hands them back: lowercase, trimmed keys.
pub fn normalize_tags(tags: &ObjectTags) -> ObjectTags {
    tags.iter()
        .map(|(key, value)| (key.trim().to_ascii_lowercase(), value.clone()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Attributes of a single stored object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectStat {
    pub key: ObjectKey,
    pub size: u64,
    pub etag: Option<String>,
    pub version_id: Option<String>,
    pub last_modified: DateTime<Utc>,
    pub content_type: Option<String>,
}

/// One entry of an object listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemInfo {
    pub key: ObjectKey,
    pub size: u64,
    pub etag: Option<String>,
    pub last_modified: DateTime<Utc>,
}

/// Inclusive byte range, as in `Range: bytes=begin-end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataRange {
    begin: u64,
    end: u64,
}

impl DataRange {
    pub fn new(begin: u64, end: u64) -> Result<Self, ValidationError> {
        if begin > end {
            return Err(ValidationError::InvalidDataRange { begin, end });
        }
        Ok(Self { begin, end })
    }

    pub fn begin(&self) -> u64 {
        self.begin
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    /// Exclusive end of the range, `None` when it runs to `u64::MAX`
    pub fn end_exclusive(&self) -> Option<u64> {
        self.end.checked_add(1)
    }
}

impl std::str::FromStr for DataRange {
    type Err = ValidationError;

    /// Parses `begin-end`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidField {
            field: "range".to_string(),
            value: s.to_string(),
            expected: "<begin>-<end> byte positions".to_string(),
        };

        let (begin, end) = s.split_once('-').ok_or_else(invalid)?;
        let begin = begin.trim().parse::<u64>().map_err(|_| invalid())?;
        let end = end.trim().parse::<u64>().map_err(|_| invalid())?;
        Self::new(begin, end)
    }
}

/// Outcome of removing the objects under a prefix.
///
/// Removal stops at the first failing delete; `removed` counts the
/// deletions that succeeded before that point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkRemoval {
    pub removed: usize,
    pub aborted: Option<StorageError>,
}

impl BulkRemoval {
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none()
    }
}
