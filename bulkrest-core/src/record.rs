//! Record trait and field-level access
//!
//! A record is one stored instance of a resource. Bulk operations never know
//! the concrete record type; they read and write attributes by name through
//! the [`Record`] trait. The default implementations round-trip through
//! `serde_json`, so a plain `#[derive(Serialize, Deserialize)]` struct only
//! needs to name its resource.

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::RecordError;

/// Value of a single record attribute.
pub type FieldValue = serde_json::Value;

/// Mapping from field name to value: one payload item, or a validated subset
/// of a record's attributes.
pub type FieldSet = serde_json::Map<String, FieldValue>;

// ============================================================================
// LOOKUP KEY
// ============================================================================

/// Canonical, hashable form of a lookup-field value.
///
/// Strings map to themselves, numbers and booleans to their JSON text. This
/// lets an integer primary key in a payload (`{"id": 1}`) match the same key
/// taken from a URL path segment (`/widgets/1`). A float with no fractional
/// part keys like the integer it equals, so `1.0` matches `1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupKey(String);

impl LookupKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Derive a key from a field value. Null, arrays and objects have no key.
    pub fn from_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::String(s) => Some(Self(s.clone())),
            FieldValue::Number(n) => Some(Self(canonical_number(n))),
            FieldValue::Bool(b) => Some(Self(b.to_string())),
            FieldValue::Null | FieldValue::Array(_) | FieldValue::Object(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn canonical_number(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LookupKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for LookupKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for LookupKey {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl From<i32> for LookupKey {
    fn from(value: i32) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for LookupKey {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

// ============================================================================
// RECORD TRAIT
// ============================================================================

/// A stored instance of a resource, addressable by field name.
///
/// Implementations must serialize to a JSON object that contains every
/// attribute (no `skip_serializing_if`), otherwise [`Record::set_field`]
/// treats the skipped attribute as unknown.
pub trait Record: Sized + Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Resource name used in logs and error messages (e.g., "widget").
    const RESOURCE_NAME: &'static str;

    /// Serialize the record into its field map.
    fn to_fields(&self) -> Result<FieldSet, RecordError> {
        match serde_json::to_value(self) {
            Ok(FieldValue::Object(fields)) => Ok(fields),
            Ok(other) => Err(RecordError::Serialization {
                resource: Self::RESOURCE_NAME.to_string(),
                reason: format!("expected an object, got {}", json_type_name(&other)),
            }),
            Err(e) => Err(RecordError::Serialization {
                resource: Self::RESOURCE_NAME.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Build a record from a validated field set.
    fn from_fields(fields: FieldSet) -> Result<Self, RecordError> {
        serde_json::from_value(FieldValue::Object(fields)).map_err(|e| RecordError::Construction {
            resource: Self::RESOURCE_NAME.to_string(),
            reason: e.to_string(),
        })
    }

    /// Read one attribute. Returns `None` for unknown fields.
    fn field(&self, name: &str) -> Option<FieldValue> {
        self.to_fields().ok()?.remove(name)
    }

    /// Assign one attribute in place.
    ///
    /// On error the record is left unchanged.
    fn set_field(&mut self, name: &str, value: FieldValue) -> Result<(), RecordError> {
        let mut fields = self.to_fields()?;
        if !fields.contains_key(name) {
            return Err(RecordError::UnknownField {
                resource: Self::RESOURCE_NAME.to_string(),
                field: name.to_string(),
            });
        }
        fields.insert(name.to_string(), value);
        *self = serde_json::from_value(FieldValue::Object(fields)).map_err(|e| {
            RecordError::InvalidValue {
                resource: Self::RESOURCE_NAME.to_string(),
                field: name.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(())
    }

    /// Lookup key of this record under `lookup_field`, if it has one.
    fn lookup_key(&self, lookup_field: &str) -> Option<LookupKey> {
        self.field(lookup_field)
            .as_ref()
            .and_then(LookupKey::from_value)
    }
}

/// Human-readable JSON type name, used in validation and record errors.
pub fn json_type_name(value: &FieldValue) -> &'static str {
    match value {
        FieldValue::Null => "null",
        FieldValue::Bool(_) => "bool",
        FieldValue::Number(n) if n.is_f64() => "float",
        FieldValue::Number(_) => "int",
        FieldValue::String(_) => "str",
        FieldValue::Array(_) => "list",
        FieldValue::Object(_) => "dict",
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Gadget {
        id: Option<i64>,
        label: String,
        count: i64,
    }

    impl Record for Gadget {
        const RESOURCE_NAME: &'static str = "gadget";
    }

    fn gadget() -> Gadget {
        Gadget {
            id: Some(7),
            label: "spring".to_string(),
            count: 3,
        }
    }

    #[test]
    fn test_lookup_key_from_value() {
        assert_eq!(LookupKey::from_value(&json!(1)), Some(LookupKey::from(1)));
        assert_eq!(LookupKey::from_value(&json!("abc")), Some(LookupKey::from("abc")));
        assert_eq!(LookupKey::from_value(&json!(true)), Some(LookupKey::from("true")));
        assert_eq!(LookupKey::from_value(&json!(null)), None);
        assert_eq!(LookupKey::from_value(&json!([1])), None);
        assert_eq!(LookupKey::from_value(&json!({"a": 1})), None);
    }

    #[test]
    fn test_integral_float_key_matches_integer_key() {
        assert_eq!(LookupKey::from_value(&json!(1.0)), Some(LookupKey::from(1)));
        assert_eq!(LookupKey::from_value(&json!(-3.0)), Some(LookupKey::from(-3)));
        assert_eq!(LookupKey::from_value(&json!(1.5)), Some(LookupKey::from("1.5")));
    }

    #[test]
    fn test_json_type_name_splits_numbers() {
        assert_eq!(json_type_name(&json!(5)), "int");
        assert_eq!(json_type_name(&json!(5.5)), "float");
        assert_eq!(json_type_name(&json!("x")), "str");
    }

    #[test]
    fn test_integer_key_matches_path_segment() {
        let from_payload = LookupKey::from_value(&json!(12));
        assert_eq!(from_payload, Some(LookupKey::from("12")));
    }

    #[test]
    fn test_field_reads_attribute() {
        let g = gadget();
        assert_eq!(g.field("label"), Some(json!("spring")));
        assert_eq!(g.field("missing"), None);
        assert_eq!(g.lookup_key("id"), Some(LookupKey::from(7)));
    }

    #[test]
    fn test_set_field_assigns_value() -> Result<(), RecordError> {
        let mut g = gadget();
        g.set_field("label", json!("coil"))?;
        g.set_field("count", json!(9))?;
        assert_eq!(g.label, "coil");
        assert_eq!(g.count, 9);
        Ok(())
    }

    #[test]
    fn test_set_field_unknown_field_is_error() {
        let mut g = gadget();
        let err = g.set_field("colour", json!("red"));
        assert!(matches!(err, Err(RecordError::UnknownField { .. })));
        assert_eq!(g, gadget());
    }

    #[test]
    fn test_set_field_type_mismatch_leaves_record_unchanged() {
        let mut g = gadget();
        let err = g.set_field("count", json!("many"));
        assert!(matches!(err, Err(RecordError::InvalidValue { .. })));
        assert_eq!(g, gadget());
    }

    #[test]
    fn test_null_key_has_no_lookup() {
        let mut g = gadget();
        g.id = None;
        assert_eq!(g.lookup_key("id"), None);
    }

    #[test]
    fn test_from_fields_builds_record() -> Result<(), RecordError> {
        let mut fields = FieldSet::new();
        fields.insert("label".to_string(), json!("bolt"));
        fields.insert("count".to_string(), json!(1));
        let g = Gadget::from_fields(fields)?;
        assert_eq!(g.id, None);
        assert_eq!(g.label, "bolt");
        Ok(())
    }
}
