//! Create Service
//!
//! Routes a creation payload to the single-record or the bulk path by its
//! shape. The bulk path is all-or-nothing: the whole batch is validated
//! first and persisted with one `bulk_create` call.

use bulkrest_core::{
    BulkConfig, FieldSet, FieldValue, Payload, Record, ValidationErrors, ValidationMode, Validator,
};
use bulkrest_storage::Repository;
use serde::Serialize;

use crate::error::BulkError;

/// Outcome of a create request. Serializes as the bare record or array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Created<R> {
    One(R),
    Many(Vec<R>),
}

impl<R> Created<R> {
    pub fn is_many(&self) -> bool {
        matches!(self, Created::Many(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Created::One(_) => 1,
            Created::Many(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_vec(self) -> Vec<R> {
        match self {
            Created::One(record) => vec![record],
            Created::Many(records) => records,
        }
    }
}

/// Create one record or a batch, depending on the payload shape.
pub async fn create_records<R: Record>(
    repo: &dyn Repository<R>,
    validator: &dyn Validator,
    payload: Payload,
    config: &BulkConfig,
) -> Result<Created<R>, BulkError> {
    match payload {
        Payload::Single(item) => create_record(repo, validator, &item).await.map(Created::One),
        Payload::Batch(items) => bulk_create_records(repo, validator, &items, config.max_batch_size)
            .await
            .map(Created::Many),
    }
}

/// Single-record create.
pub async fn create_record<R: Record>(
    repo: &dyn Repository<R>,
    validator: &dyn Validator,
    item: &FieldSet,
) -> Result<R, BulkError> {
    let validated = validator
        .validate_one(item, false)
        .map_err(|errors| BulkError::Invalid(ValidationErrors::Item(errors)))?;

    let record = R::from_fields(validated)?;
    let created = repo.create(record).await?;
    tracing::debug!(resource = R::RESOURCE_NAME, "Created record");
    Ok(created)
}

/// Validate every item, then persist them all in one operation.
///
/// Nothing is persisted if any item fails validation, including an item
/// that is not a JSON object.
pub async fn bulk_create_records<R: Record>(
    repo: &dyn Repository<R>,
    validator: &dyn Validator,
    items: &[FieldValue],
    max_items: Option<usize>,
) -> Result<Vec<R>, BulkError> {
    let mode = ValidationMode::many(false).with_max_items(max_items);
    let validated = validator.validate_values(items, &mode).map_err(|errors| {
        tracing::info!(
            resource = R::RESOURCE_NAME,
            items = items.len(),
            invalid = errors.invalid_items(),
            "Bulk create rejected"
        );
        BulkError::Invalid(errors)
    })?;

    let records = validated
        .into_iter()
        .map(R::from_fields)
        .collect::<Result<Vec<_>, _>>()?;

    let created = repo.bulk_create(records).await?;
    tracing::info!(
        resource = R::RESOURCE_NAME,
        count = created.len(),
        "Bulk created records"
    );
    Ok(created)
}
