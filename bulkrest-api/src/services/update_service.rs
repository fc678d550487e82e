//! Update Service
//!
//! Bulk update reconciliation. Incoming items are matched to the records of
//! an already-scoped collection by a lookup field; matched records receive
//! the item's remaining fields and are saved field-by-field. Items matching
//! no record are dropped without error but counted.

use std::collections::{HashMap, HashSet};

use bulkrest_core::{
    FieldSet, FieldValue, LookupKey, Record, ValidationErrors, ValidationMode, Validator,
    DEFAULT_LOOKUP_FIELD,
};
use bulkrest_storage::{Collection, Repository};

use crate::error::BulkError;

/// How incoming items are matched and validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOptions {
    pub lookup_field: String,
    /// Leave fields missing from an item untouched instead of requiring them.
    pub partial: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_FIELD)
    }
}

impl UpdateOptions {
    pub fn new(lookup_field: impl Into<String>) -> Self {
        Self {
            lookup_field: lookup_field.into(),
            partial: false,
        }
    }

    pub fn partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }
}

/// Result of a bulk update.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkUpdate<R> {
    /// Updated records in the order of the scoped collection.
    pub updated: Vec<R>,
    /// Item keys that matched no record in scope.
    pub unmatched: usize,
}

/// Apply `items` to the records of `existing`.
///
/// The batch is validated as a whole first; on failure nothing is touched.
/// When two items carry the same key the later one wins. An item with no
/// fields besides its key changes nothing and its record is not returned.
pub async fn update_records<R: Record>(
    repo: &dyn Repository<R>,
    validator: &dyn Validator,
    existing: &Collection<R>,
    items: &[FieldSet],
    options: &UpdateOptions,
    max_items: Option<usize>,
) -> Result<BulkUpdate<R>, BulkError> {
    let mode = update_mode(options, max_items);
    let validated = validator
        .validate(items, &mode)
        .map_err(|errors| rejected::<R>(errors, items.len(), options))?;
    reconcile(repo, existing, validated, options).await
}

/// [`update_records`] over raw JSON items from a request body. Items that
/// are not objects fail validation.
pub async fn update_values<R: Record>(
    repo: &dyn Repository<R>,
    validator: &dyn Validator,
    existing: &Collection<R>,
    items: &[FieldValue],
    options: &UpdateOptions,
    max_items: Option<usize>,
) -> Result<BulkUpdate<R>, BulkError> {
    let mode = update_mode(options, max_items);
    let validated = validator
        .validate_values(items, &mode)
        .map_err(|errors| rejected::<R>(errors, items.len(), options))?;
    reconcile(repo, existing, validated, options).await
}

fn update_mode(options: &UpdateOptions, max_items: Option<usize>) -> ValidationMode {
    ValidationMode::many(options.partial)
        .with_lookup_field(options.lookup_field.as_str())
        .with_max_items(max_items)
}

fn rejected<R: Record>(errors: ValidationErrors, items: usize, options: &UpdateOptions) -> BulkError {
    tracing::info!(
        resource = R::RESOURCE_NAME,
        items,
        invalid = errors.invalid_items(),
        partial = options.partial,
        "Bulk update rejected"
    );
    BulkError::Invalid(errors)
}

async fn reconcile<R: Record>(
    repo: &dyn Repository<R>,
    existing: &Collection<R>,
    validated: Vec<FieldSet>,
    options: &UpdateOptions,
) -> Result<BulkUpdate<R>, BulkError> {
    let (changes, unkeyed) = index_by_key(validated, &options.lookup_field);

    // Build every mutation before the first write so a record that refuses
    // a value leaves storage untouched.
    let mut matched: HashSet<&LookupKey> = HashSet::new();
    let mut pending: Vec<(R, Vec<String>)> = Vec::new();
    for record in existing {
        let Some(key) = record.lookup_key(&options.lookup_field) else {
            continue;
        };
        let Some((key, fields)) = changes.get_key_value(&key) else {
            continue;
        };
        matched.insert(key);
        if fields.is_empty() {
            continue;
        }

        let mut record = record.clone();
        let mut changed = Vec::with_capacity(fields.len());
        for (name, value) in fields {
            record.set_field(name, value.clone())?;
            changed.push(name.clone());
        }
        pending.push((record, changed));
    }

    let unmatched = unkeyed + changes.len() - matched.len();
    if unmatched > 0 {
        tracing::info!(
            resource = R::RESOURCE_NAME,
            unmatched,
            "Bulk update items matched no record in scope"
        );
    }

    let mut updated = Vec::with_capacity(pending.len());
    for (record, changed) in pending {
        repo.save(&record, &changed).await?;
        updated.push(record);
    }

    tracing::info!(
        resource = R::RESOURCE_NAME,
        count = updated.len(),
        partial = options.partial,
        "Bulk updated records"
    );
    Ok(BulkUpdate { updated, unmatched })
}

/// Bulk update that leaves missing fields untouched.
pub async fn partial_update_records<R: Record>(
    repo: &dyn Repository<R>,
    validator: &dyn Validator,
    existing: &Collection<R>,
    items: &[FieldSet],
    options: &UpdateOptions,
    max_items: Option<usize>,
) -> Result<BulkUpdate<R>, BulkError> {
    let options = options.clone().partial(true);
    update_records(repo, validator, existing, items, &options, max_items).await
}

/// Map each item's key to its remaining fields.
///
/// Returns the map and the number of items whose key value cannot be a
/// lookup key (lists, objects).
fn index_by_key(items: Vec<FieldSet>, lookup_field: &str) -> (HashMap<LookupKey, FieldSet>, usize) {
    let mut changes = HashMap::with_capacity(items.len());
    let mut unkeyed = 0;
    for mut item in items {
        match item.remove(lookup_field).as_ref().and_then(LookupKey::from_value) {
            Some(key) => {
                changes.insert(key, item);
            }
            None => unkeyed += 1,
        }
    }
    (changes, unkeyed)
}
