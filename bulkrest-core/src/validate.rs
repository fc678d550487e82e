//! Validation contract
//!
//! Raw payload items are turned into validated field sets before any bulk
//! operation touches storage. Batch ("many") validation is all-or-nothing:
//! every item is checked and the errors of all items are reported together.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::{json_type_name, FieldSet, FieldValue};

/// Key under which item-level (not field-specific) errors are reported.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Message for a required field that is absent.
pub const MSG_REQUIRED: &str = "This field is required.";

// ============================================================================
// ERROR SHAPES
// ============================================================================

/// Validation errors of one item: field name to list of messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors consisting of a single item-level message.
    pub fn non_field(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(NON_FIELD_ERRORS, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields with at least one error.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Errors returned by [`Validator::validate`].
///
/// `Batch` serializes as an array aligned with the input items (`{}` for
/// items that passed); `Item` serializes as a single object and is used for
/// single-item validation and for errors about the batch as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValidationErrors {
    Batch(Vec<FieldErrors>),
    Item(FieldErrors),
}

impl ValidationErrors {
    /// Number of items that failed validation.
    pub fn invalid_items(&self) -> usize {
        match self {
            ValidationErrors::Batch(items) => items.iter().filter(|e| !e.is_empty()).count(),
            ValidationErrors::Item(errors) => usize::from(!errors.is_empty()),
        }
    }
}

// ============================================================================
// VALIDATION MODE
// ============================================================================

/// How a batch is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationMode {
    /// Validate a list of items rather than exactly one.
    pub many: bool,
    /// Missing fields are left untouched instead of being required.
    pub partial: bool,
    /// Bulk update only: the lookup field is kept in each validated item,
    /// even when it is read-only, and must be present.
    pub lookup_field: Option<String>,
    /// Maximum number of items accepted in one batch.
    pub max_items: Option<usize>,
}

impl ValidationMode {
    pub fn single(partial: bool) -> Self {
        Self {
            many: false,
            partial,
            ..Self::default()
        }
    }

    pub fn many(partial: bool) -> Self {
        Self {
            many: true,
            partial,
            ..Self::default()
        }
    }

    pub fn with_lookup_field(mut self, field: impl Into<String>) -> Self {
        self.lookup_field = Some(field.into());
        self
    }

    pub fn with_max_items(mut self, max_items: Option<usize>) -> Self {
        self.max_items = max_items;
        self
    }
}

// ============================================================================
// VALIDATOR TRAIT
// ============================================================================

/// Turns raw payload items into validated field sets.
pub trait Validator: Send + Sync {
    /// Validate one item. With `partial`, absent fields are not required.
    fn validate_one(&self, item: &FieldSet, partial: bool) -> Result<FieldSet, FieldErrors>;

    /// Validate a batch according to `mode`.
    ///
    /// Either every item validates and all validated sets are returned in
    /// input order, or nothing is returned and the errors of every item are.
    fn validate(
        &self,
        items: &[FieldSet],
        mode: &ValidationMode,
    ) -> Result<Vec<FieldSet>, ValidationErrors> {
        if !mode.many {
            return match items {
                [item] => self
                    .validate_one(item, mode.partial)
                    .map(|validated| vec![validated])
                    .map_err(ValidationErrors::Item),
                _ => Err(item_count_error(items.len())),
            };
        }
        validate_batch(self, items.iter().map(Ok), items.len(), mode)
    }

    /// Validate raw JSON items, as decoded from a request body.
    ///
    /// Behaves like [`Validator::validate`]; an item that is not an object
    /// fails with an item-level error naming its type.
    fn validate_values(
        &self,
        items: &[FieldValue],
        mode: &ValidationMode,
    ) -> Result<Vec<FieldSet>, ValidationErrors> {
        if !mode.many {
            return match items {
                [FieldValue::Object(item)] => self
                    .validate_one(item, mode.partial)
                    .map(|validated| vec![validated])
                    .map_err(ValidationErrors::Item),
                [other] => Err(ValidationErrors::Item(FieldErrors::non_field(
                    expected_dict_message(other),
                ))),
                _ => Err(item_count_error(items.len())),
            };
        }
        let items_iter = items.iter().map(|value| match value {
            FieldValue::Object(item) => Ok(item),
            other => Err(other),
        });
        validate_batch(self, items_iter, items.len(), mode)
    }
}

/// Item error for a batch entry that is not an object.
pub fn expected_dict_message(value: &FieldValue) -> String {
    format!(
        "Invalid data. Expected a dictionary, but got {}.",
        json_type_name(value)
    )
}

fn item_count_error(count: usize) -> ValidationErrors {
    ValidationErrors::Item(FieldErrors::non_field(format!(
        "Expected a single item but got {} items.",
        count
    )))
}

/// Shared "many" validation. `Err` entries are items that are not objects.
fn validate_batch<'a, V, I>(
    validator: &V,
    items: I,
    len: usize,
    mode: &ValidationMode,
) -> Result<Vec<FieldSet>, ValidationErrors>
where
    V: Validator + ?Sized,
    I: Iterator<Item = Result<&'a FieldSet, &'a FieldValue>>,
{
    if let Some(max) = mode.max_items {
        if len > max {
            return Err(ValidationErrors::Item(FieldErrors::non_field(format!(
                "Ensure this field has no more than {} elements.",
                max
            ))));
        }
    }

    let mut validated = Vec::with_capacity(len);
    let mut errors = Vec::with_capacity(len);
    let mut failed = false;

    for item in items {
        let (fields, item_errors) = match item {
            Ok(item) => check_item(validator, item, mode),
            Err(value) => (
                FieldSet::new(),
                FieldErrors::non_field(expected_dict_message(value)),
            ),
        };
        failed |= !item_errors.is_empty();
        validated.push(fields);
        errors.push(item_errors);
    }

    if failed {
        Err(ValidationErrors::Batch(errors))
    } else {
        Ok(validated)
    }
}

fn check_item<V: Validator + ?Sized>(
    validator: &V,
    item: &FieldSet,
    mode: &ValidationMode,
) -> (FieldSet, FieldErrors) {
    let (mut fields, mut item_errors) = match validator.validate_one(item, mode.partial) {
        Ok(fields) => (fields, FieldErrors::new()),
        Err(item_errors) => (FieldSet::new(), item_errors),
    };

    if let Some(lookup_field) = &mode.lookup_field {
        match item.get(lookup_field) {
            Some(value) if !value.is_null() => {
                fields.insert(lookup_field.clone(), value.clone());
            }
            _ => item_errors.add(lookup_field.as_str(), MSG_REQUIRED),
        }
    }
    (fields, item_errors)
}
