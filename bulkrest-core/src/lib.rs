//! bulkrest Core - Record, Payload and Validation Types
//!
//! Shared vocabulary for bulk resource operations. All other crates depend on
//! this one. No I/O happens here: storage lives in bulkrest-storage and the
//! request-facing operations in bulkrest-api.

pub mod actions;
pub mod config;
pub mod error;
pub mod filter;
pub mod payload;
pub mod record;
pub mod schema;
pub mod validate;

pub use actions::BulkActions;
pub use config::{BulkConfig, DestroyPolicy, DEFAULT_LOOKUP_FIELD};
pub use error::{
    BulkrestError, BulkrestResult, ConfigError, RecordError, StorageError, StorageResult,
};
pub use filter::FilterCriteria;
pub use payload::Payload;
pub use record::{json_type_name, FieldSet, FieldValue, LookupKey, Record};
pub use schema::{expected_list_message, FieldKind, FieldSpec, ResourceSchema};
pub use validate::{
    expected_dict_message, FieldErrors, ValidationErrors, ValidationMode, Validator, MSG_REQUIRED,
    NON_FIELD_ERRORS,
};
