//! Declarative resource schema
//!
//! [`ResourceSchema`] is the reference [`Validator`]: a list of typed field
//! declarations checked against each payload item. Unknown payload fields are
//! ignored and read-only fields are dropped from the validated output.

use serde::{Deserialize, Serialize};

use crate::record::{json_type_name, FieldSet, FieldValue};
use crate::validate::{FieldErrors, Validator, MSG_REQUIRED};

/// Value type accepted by a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    String { max_length: Option<usize> },
    Integer { min: Option<i64>, max: Option<i64> },
    Float,
    Boolean,
    /// Any JSON value.
    Json,
}

/// Declaration of one resource field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub read_only: bool,
    pub allow_null: bool,
    pub allow_blank: bool,
}

impl FieldSpec {
    fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            read_only: false,
            allow_null: false,
            allow_blank: false,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String { max_length: None })
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Integer { min: None, max: None })
    }

    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Float)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub fn json(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Json)
    }

    pub fn max_length(mut self, max: usize) -> Self {
        if let FieldKind::String { max_length } = &mut self.kind {
            *max_length = Some(max);
        }
        self
    }

    pub fn range(mut self, lower: Option<i64>, upper: Option<i64>) -> Self {
        if let FieldKind::Integer { min, max } = &mut self.kind {
            *min = lower;
            *max = upper;
        }
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Read-only fields are never accepted from a payload. Implies optional.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self.required = false;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.allow_null = true;
        self
    }

    pub fn allow_blank(mut self) -> Self {
        self.allow_blank = true;
        self
    }

    /// Check one present value, pushing messages for every violated rule.
    fn check(&self, value: &FieldValue) -> Vec<String> {
        if value.is_null() {
            return if self.allow_null {
                Vec::new()
            } else {
                vec!["This field may not be null.".to_string()]
            };
        }

        match &self.kind {
            FieldKind::String { max_length } => {
                let FieldValue::String(s) = value else {
                    return vec!["Not a valid string.".to_string()];
                };
                let mut messages = Vec::new();
                if !self.allow_blank && s.trim().is_empty() {
                    messages.push("This field may not be blank.".to_string());
                }
                if let Some(max) = max_length {
                    if s.chars().count() > *max {
                        messages.push(format!(
                            "Ensure this field has no more than {} characters.",
                            max
                        ));
                    }
                }
                messages
            }
            FieldKind::Integer { min, max } => {
                let Some(n) = value.as_i64() else {
                    return vec!["A valid integer is required.".to_string()];
                };
                let mut messages = Vec::new();
                if let Some(min) = min {
                    if n < *min {
                        messages.push(format!(
                            "Ensure this value is greater than or equal to {}.",
                            min
                        ));
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        messages.push(format!(
                            "Ensure this value is less than or equal to {}.",
                            max
                        ));
                    }
                }
                messages
            }
            FieldKind::Float => {
                if value.is_number() {
                    Vec::new()
                } else {
                    vec!["A valid number is required.".to_string()]
                }
            }
            FieldKind::Boolean => {
                if value.is_boolean() {
                    Vec::new()
                } else {
                    vec!["Must be a valid boolean.".to_string()]
                }
            }
            FieldKind::Json => Vec::new(),
        }
    }
}

/// Typed field declarations for one resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceSchema {
    fields: Vec<FieldSpec>,
}

impl ResourceSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl Validator for ResourceSchema {
    fn validate_one(&self, item: &FieldSet, partial: bool) -> Result<FieldSet, FieldErrors> {
        let mut validated = FieldSet::new();
        let mut errors = FieldErrors::new();

        for spec in self.fields.iter().filter(|f| !f.read_only) {
            match item.get(&spec.name) {
                Some(value) => {
                    let messages = spec.check(value);
                    if messages.is_empty() {
                        validated.insert(spec.name.clone(), value.clone());
                    } else {
                        for message in messages {
                            errors.add(spec.name.as_str(), message);
                        }
                    }
                }
                None if spec.required && !partial => errors.add(spec.name.as_str(), MSG_REQUIRED),
                None => {}
            }
        }

        if errors.is_empty() {
            Ok(validated)
        } else {
            Err(errors)
        }
    }
}

/// Message used when a batch operation receives a non-list body.
pub fn expected_list_message(value: &FieldValue) -> String {
    format!(
        "Expected a list of items but got type \"{}\".",
        json_type_name(value)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{ValidationErrors, ValidationMode};
    use serde_json::json;

    fn schema() -> ResourceSchema {
        ResourceSchema::new()
            .field(FieldSpec::integer("id").read_only())
            .field(FieldSpec::string("contents").max_length(16))
            .field(FieldSpec::integer("number").range(Some(0), Some(1000)))
            .field(FieldSpec::boolean("active").optional())
    }

    fn item(value: FieldValue) -> FieldSet {
        match value {
            FieldValue::Object(map) => map,
            _ => FieldSet::new(),
        }
    }

    #[test]
    fn test_valid_item_drops_read_only_and_unknown() {
        let result = schema().validate_one(
            &item(json!({"id": 5, "contents": "hello", "number": 1, "extra": true})),
            false,
        );
        assert_eq!(result, Ok(item(json!({"contents": "hello", "number": 1}))));
    }

    #[test]
    fn test_missing_required_field() {
        let Err(errors) = schema().validate_one(&item(json!({"contents": "x"})), false) else {
            panic!("expected errors");
        };
        assert_eq!(errors.get("number"), Some(&[MSG_REQUIRED.to_string()][..]));
    }

    #[test]
    fn test_partial_allows_missing_fields() {
        let result = schema().validate_one(&item(json!({"number": 3})), true);
        assert_eq!(result, Ok(item(json!({"number": 3}))));
    }

    #[test]
    fn test_type_errors() {
        let Err(errors) = schema().validate_one(
            &item(json!({"contents": 123, "number": "x", "active": "yes"})),
            false,
        ) else {
            panic!("expected errors");
        };
        assert_eq!(errors.get("contents"), Some(&["Not a valid string.".to_string()][..]));
        assert_eq!(
            errors.get("number"),
            Some(&["A valid integer is required.".to_string()][..])
        );
        assert_eq!(errors.get("active"), Some(&["Must be a valid boolean.".to_string()][..]));
    }

    #[test]
    fn test_constraint_errors() {
        let Err(errors) = schema().validate_one(
            &item(json!({"contents": "this is far too long", "number": 1001})),
            false,
        ) else {
            panic!("expected errors");
        };
        assert_eq!(
            errors.get("contents"),
            Some(&["Ensure this field has no more than 16 characters.".to_string()][..])
        );
        assert_eq!(
            errors.get("number"),
            Some(&["Ensure this value is less than or equal to 1000.".to_string()][..])
        );
    }

    #[test]
    fn test_null_and_blank() {
        let Err(errors) =
            schema().validate_one(&item(json!({"contents": "  ", "number": null})), false)
        else {
            panic!("expected errors");
        };
        assert_eq!(
            errors.get("contents"),
            Some(&["This field may not be blank.".to_string()][..])
        );
        assert_eq!(
            errors.get("number"),
            Some(&["This field may not be null.".to_string()][..])
        );
    }

    #[test]
    fn test_bulk_update_keeps_read_only_lookup() {
        let items = vec![item(json!({"id": 1, "number": 2}))];
        let mode = ValidationMode::many(true).with_lookup_field("id");
        assert_eq!(
            schema().validate(&items, &mode),
            Ok(vec![item(json!({"id": 1, "number": 2}))])
        );
    }

    #[test]
    fn test_full_update_rejects_partial_items() {
        let items = vec![item(json!({"id": 1, "number": 2}))];
        let mode = ValidationMode::many(false).with_lookup_field("id");
        let result = schema().validate(&items, &mode);
        assert!(matches!(result, Err(ValidationErrors::Batch(_))));
    }

    #[test]
    fn test_expected_list_message() {
        assert_eq!(
            expected_list_message(&json!({})),
            "Expected a list of items but got type \"dict\"."
        );
    }
}
