//! Detail Service
//!
//! Request scoping and the single-record operations that sit beside the
//! bulk ones: list, retrieve, update and partial update.

use bulkrest_core::{FieldSet, FilterCriteria, LookupKey, Record, ValidationErrors, Validator};
use bulkrest_storage::{Collection, Repository};

use crate::error::{ApiError, ApiResult, BulkError};

/// The full collection of a resource and the part of it a request acts on.
#[derive(Debug, Clone)]
pub struct Scope<R> {
    pub base: Collection<R>,
    pub filtered: Collection<R>,
}

impl<R> Scope<R> {
    /// Whether the request narrowed the collection at all.
    pub fn is_filtered(&self) -> bool {
        !self.base.is_same(&self.filtered)
    }
}

/// Load the resource and apply `criteria`.
///
/// Without criteria no filter runs and `filtered` is the base collection
/// itself, which a bulk destroy will refuse.
pub async fn load_scope<R: Record>(
    repo: &dyn Repository<R>,
    criteria: &FilterCriteria,
) -> ApiResult<Scope<R>> {
    let base = repo.query_all().await?;
    let filtered = if criteria.is_empty() {
        base.clone()
    } else {
        repo.filter(&base, criteria)
    };
    Ok(Scope { base, filtered })
}

/// Find the record of `scope` whose lookup field equals `key`.
pub fn find_record<R: Record>(scope: &Scope<R>, lookup_field: &str, key: &LookupKey) -> ApiResult<R> {
    scope
        .filtered
        .find(lookup_field, key)
        .cloned()
        .ok_or_else(|| ApiError::entity_not_found(R::RESOURCE_NAME, key))
}

/// Validate `item` against one existing record and save the changed fields.
pub async fn update_record<R: Record>(
    repo: &dyn Repository<R>,
    validator: &dyn Validator,
    record: &R,
    item: &FieldSet,
    partial: bool,
) -> Result<R, BulkError> {
    let validated = validator
        .validate_one(item, partial)
        .map_err(|errors| BulkError::Invalid(ValidationErrors::Item(errors)))?;

    if validated.is_empty() {
        return Ok(record.clone());
    }

    let mut updated = record.clone();
    let mut changed = Vec::with_capacity(validated.len());
    for (name, value) in validated {
        updated.set_field(&name, value)?;
        changed.push(name);
    }
    repo.save(&updated, &changed).await?;
    tracing::debug!(
        resource = R::RESOURCE_NAME,
        fields = changed.len(),
        partial,
        "Updated record"
    );
    Ok(updated)
}
