//! Sample resource served by the demo binary.

use bulkrest_core::{FieldSpec, Record, ResourceSchema};
use serde::{Deserialize, Serialize};

/// A record with short text contents and a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SimpleModel {
    /// Assigned by storage on create.
    #[serde(default)]
    pub id: Option<i64>,
    pub contents: String,
    pub number: i64,
}

impl Record for SimpleModel {
    const RESOURCE_NAME: &'static str = "simple";
}

/// Validation schema for [`SimpleModel`].
pub fn simple_schema() -> ResourceSchema {
    ResourceSchema::new()
        .field(FieldSpec::integer("id").read_only())
        .field(FieldSpec::string("contents").max_length(16))
        .field(FieldSpec::integer("number"))
}
