/// Validation errors for domain value objects
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    // ObjectKey validation errors
    EmptyObjectKey,
    ObjectKeyTooLong {
        actual: usize,
        max: usize,
    },
    InvalidObjectKeyCharacter(char),
    ObjectKeyStartsWithSlash,
    ObjectKeyContainsDoubleSlash,

    // BucketName validation errors
    BucketNameTooShort {
        actual: usize,
        min: usize,
    },
    BucketNameTooLong {
        actual: usize,
        max: usize,
    },
    BucketNameInvalidStart,
    BucketNameInvalidEnd,
    BucketNameInvalidCharacter(char),
    BucketNameConsecutiveSeparators,
    BucketNameLooksLikeIpAddress,

    // Engine and range errors
    UnknownEngine(String),
    InvalidDataRange {
        begin: u64,
        end: u64,
    },
    InvalidField {
        field: String,
        value: String,
        expected: String,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyObjectKey => write!(f, "Object key cannot be empty"),
            ValidationError::ObjectKeyTooLong { actual, max } => {
                write!(f, "Object key too long: {} bytes (max: {})", actual, max)
            }
            ValidationError::InvalidObjectKeyCharacter(c) => {
                write!(f, "Invalid character in object key: {:?}", c)
            }
            ValidationError::ObjectKeyStartsWithSlash => {
                write!(f, "Object key cannot start with '/'")
            }
            ValidationError::ObjectKeyContainsDoubleSlash => {
                write!(f, "Object key cannot contain '//'")
            }
            ValidationError::BucketNameTooShort { actual, min } => {
                write!(f, "Bucket name too short: {} chars (min: {})", actual, min)
            }
            ValidationError::BucketNameTooLong { actual, max } => {
                write!(f, "Bucket name too long: {} chars (max: {})", actual, max)
            }
            ValidationError::BucketNameInvalidStart => {
                write!(f, "Bucket name must start with a lowercase letter or number")
            }
            ValidationError::BucketNameInvalidEnd => {
                write!(f, "Bucket name must end with a lowercase letter or number")
            }
            ValidationError::BucketNameInvalidCharacter(c) => {
                write!(f, "Invalid character in bucket name: '{}'", c)
            }
            ValidationError::BucketNameConsecutiveSeparators => {
                write!(f, "Bucket name cannot contain consecutive '.'")
            }
            ValidationError::BucketNameLooksLikeIpAddress => {
                write!(f, "Bucket name cannot be formatted as an IP address")
            }
            ValidationError::UnknownEngine(name) => {
                write!(f, "Unknown S3 engine '{}' (expected one of: aws, minio)", name)
            }
            ValidationError::InvalidDataRange { begin, end } => {
                write!(f, "Invalid data range: {}-{} (begin must not exceed end)", begin, end)
            }
            ValidationError::InvalidField {
                field,
                value,
                expected,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': expected {}",
                    value, field, expected
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
