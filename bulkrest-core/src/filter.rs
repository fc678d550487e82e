//! Filter criteria for narrowing a record collection
//!
//! Criteria come from the request query string, so expected values are text.
//! A record matches when every named field renders to the expected text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::{FieldValue, Record};

/// Equality predicates over record fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterCriteria(BTreeMap<String, String>);

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality predicate.
    pub fn eq(mut self, field: impl Into<String>, expected: impl Into<String>) -> Self {
        self.0.insert(field.into(), expected.into());
        self
    }

    /// No predicate means no filter is applied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn predicates(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether `record` satisfies every predicate.
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        let Ok(fields) = record.to_fields() else {
            return false;
        };
        self.0.iter().all(|(field, expected)| {
            fields
                .get(field)
                .is_some_and(|value| value_matches(value, expected))
        })
    }
}

impl From<BTreeMap<String, String>> for FilterCriteria {
    fn from(predicates: BTreeMap<String, String>) -> Self {
        Self(predicates)
    }
}

fn value_matches(value: &FieldValue, expected: &str) -> bool {
    match value {
        FieldValue::String(s) => s == expected,
        FieldValue::Number(n) => n.to_string() == expected,
        FieldValue::Bool(b) => b.to_string() == expected,
        FieldValue::Null => expected.is_empty() || expected == "null",
        FieldValue::Array(_) | FieldValue::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Parcel {
        id: i64,
        label: String,
        sealed: bool,
        note: Option<String>,
    }

    impl Record for Parcel {
        const RESOURCE_NAME: &'static str = "parcel";
    }

    fn sample() -> Parcel {
        Parcel {
            id: 3,
            label: "apples".to_string(),
            sealed: true,
            note: None,
        }
    }

    #[test]
    fn test_empty_criteria_matches_everything() {
        assert!(FilterCriteria::new().matches(&sample()));
        assert!(FilterCriteria::new().is_empty());
    }

    #[test]
    fn test_matches_by_text_form() {
        let record = sample();
        assert!(FilterCriteria::new().eq("id", "3").matches(&record));
        assert!(FilterCriteria::new().eq("label", "apples").matches(&record));
        assert!(FilterCriteria::new().eq("sealed", "true").matches(&record));
        assert!(FilterCriteria::new().eq("note", "null").matches(&record));
    }

    #[test]
    fn test_all_predicates_must_hold() {
        let criteria = FilterCriteria::new().eq("id", "3").eq("label", "pears");
        assert!(!criteria.matches(&sample()));
        assert_eq!(criteria.len(), 2);
    }

    #[test]
    fn test_unknown_field_never_matches() {
        assert!(!FilterCriteria::new().eq("colour", "red").matches(&sample()));
    }
}
