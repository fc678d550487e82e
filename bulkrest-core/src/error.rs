//! Error types for bulkrest operations

use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Record not found: {resource} with key {key}")]
    NotFound { resource: String, key: String },

    #[error("Insert failed for {resource}: {reason}")]
    InsertFailed { resource: String, reason: String },

    #[error("Update failed for {resource} with key {key}: {reason}")]
    UpdateFailed {
        resource: String,
        key: String,
        reason: String,
    },

    #[error("Delete failed for {resource} with key {key}: {reason}")]
    DeleteFailed {
        resource: String,
        key: String,
        reason: String,
    },

    #[error("Record of {resource} has no usable value for lookup field '{field}'")]
    MissingKey { resource: String, field: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Errors raised while reading or writing a record's fields.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("Unknown field '{field}' on {resource}")]
    UnknownField { resource: String, field: String },

    #[error("Invalid value for {resource}.{field}: {reason}")]
    InvalidValue {
        resource: String,
        field: String,
        reason: String,
    },

    #[error("Failed to serialize {resource}: {reason}")]
    Serialization { resource: String, reason: String },

    #[error("Failed to build {resource} from fields: {reason}")]
    Construction { resource: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all bulkrest errors.
#[derive(Debug, Clone, Error)]
pub enum BulkrestError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Record error: {0}")]
    Record(#[from] RecordError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for bulkrest operations.
pub type BulkrestResult<T> = Result<T, BulkrestError>;

/// Result type alias for repository operations.
pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display_not_found() {
        let err = StorageError::NotFound {
            resource: "widget".to_string(),
            key: "42".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Record not found"));
        assert!(msg.contains("widget"));
        assert!(msg.contains("42"));
    }

    #[test]
    fn test_record_error_display_unknown_field() {
        let err = RecordError::UnknownField {
            resource: "widget".to_string(),
            field: "colour".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Unknown field"));
        assert!(msg.contains("colour"));
    }

    #[test]
    fn test_config_error_display_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "BULKREST_DESTROY_POLICY".to_string(),
            value: "everything".to_string(),
            reason: "expected distinct or proper_subset".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("BULKREST_DESTROY_POLICY"));
        assert!(msg.contains("everything"));
        assert!(msg.contains("proper_subset"));
    }

    #[test]
    fn test_bulkrest_error_from_storage() {
        let err: BulkrestError = StorageError::LockPoisoned.into();
        assert!(matches!(err, BulkrestError::Storage(StorageError::LockPoisoned)));
        assert!(format!("{}", err).starts_with("Storage error"));
    }
}
