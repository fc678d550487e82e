//! Request payload decoding
//!
//! A create request carries either one object or a list of items. The
//! shape is decided once, when the body is decoded, so the dispatcher matches
//! on a variant instead of inspecting the body at runtime. Batch items stay
//! raw JSON until validation, which reports non-object entries per item.

use serde::{Deserialize, Serialize};

use crate::record::{FieldSet, FieldValue};
use crate::validate::{expected_dict_message, FieldErrors, ValidationErrors};

/// Decoded request body for single or bulk operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// A JSON array. Entries are checked to be objects during validation.
    Batch(Vec<FieldValue>),
    /// A single JSON object.
    Single(FieldSet),
}

impl Payload {
    /// Batch of object items.
    pub fn batch(items: impl IntoIterator<Item = FieldSet>) -> Self {
        Payload::Batch(items.into_iter().map(FieldValue::Object).collect())
    }

    /// Classify a decoded JSON body. Anything but an object or an array is
    /// rejected the way a single invalid item is.
    pub fn from_value(value: FieldValue) -> Result<Self, ValidationErrors> {
        match value {
            FieldValue::Array(items) => Ok(Payload::Batch(items)),
            FieldValue::Object(item) => Ok(Payload::Single(item)),
            other => Err(ValidationErrors::Item(FieldErrors::non_field(
                expected_dict_message(&other),
            ))),
        }
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, Payload::Batch(_))
    }

    /// Number of items carried by the payload.
    pub fn len(&self) -> usize {
        match self {
            Payload::Batch(items) => items.len(),
            Payload::Single(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// JSON type name of the body, as reported in "expected a list" errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Payload::Batch(_) => "list",
            Payload::Single(_) => "dict",
        }
    }
}
