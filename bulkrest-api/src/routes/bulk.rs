//! Collection route handlers.
//!
//! Handlers mounted on `/` of a resource: create (single or bulk, chosen by
//! the body's shape), full and partial bulk update, and bulk destroy. Every
//! operation acts on the collection narrowed by the query string.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use bulkrest_core::{FieldErrors, FieldValue, Payload, Record, ValidationErrors};

use crate::{
    error::BulkError,
    extractors::{Criteria, JsonBody},
    services::{self, UpdateOptions},
    state::ResourceState,
};

/// `POST /` - create one record from an object or many from an array.
pub(crate) async fn create_route<R: Record>(
    State(state): State<ResourceState<R>>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, BulkError> {
    let payload = Payload::from_value(body).map_err(BulkError::Invalid)?;
    let created =
        services::create_records(state.repo.as_ref(), state.validator.as_ref(), payload, &state.config)
            .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /` - bulk update, every non-key field required.
pub(crate) async fn bulk_update_route<R: Record>(
    State(state): State<ResourceState<R>>,
    Criteria(criteria): Criteria,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, BulkError> {
    bulk_update(state, criteria, body, false).await
}

/// `PATCH /` - bulk update, missing fields left untouched.
pub(crate) async fn partial_bulk_update_route<R: Record>(
    State(state): State<ResourceState<R>>,
    Criteria(criteria): Criteria,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, BulkError> {
    bulk_update(state, criteria, body, true).await
}

async fn bulk_update<R: Record>(
    state: ResourceState<R>,
    criteria: bulkrest_core::FilterCriteria,
    body: FieldValue,
    partial: bool,
) -> Result<Json<Vec<R>>, BulkError> {
    let items = batch_items(body)?;
    let scope = services::load_scope(state.repo.as_ref(), &criteria).await?;
    let options = UpdateOptions::new(state.lookup_field()).partial(partial);

    let result = services::update_values(
        state.repo.as_ref(),
        state.validator.as_ref(),
        &scope.filtered,
        &items,
        &options,
        state.config.max_batch_size,
    )
    .await?;
    Ok(Json(result.updated))
}

/// `DELETE /` - destroy every record of the filtered collection.
pub(crate) async fn bulk_destroy_route<R: Record>(
    State(state): State<ResourceState<R>>,
    Criteria(criteria): Criteria,
) -> Result<StatusCode, BulkError> {
    let scope = services::load_scope(state.repo.as_ref(), &criteria).await?;
    services::destroy_records(
        state.repo.as_ref(),
        state.hooks.as_ref(),
        &scope.base,
        &scope.filtered,
        state.config.destroy_policy,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bulk update only accepts an array body.
fn batch_items(body: FieldValue) -> Result<Vec<FieldValue>, BulkError> {
    match body {
        FieldValue::Array(items) => Ok(items),
        other => Err(BulkError::Invalid(ValidationErrors::Item(FieldErrors::non_field(
            bulkrest_core::expected_list_message(&other),
        )))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_batch_items_rejects_object() {
        let Err(BulkError::Invalid(errors)) = batch_items(json!({"id": 1})) else {
            panic!("expected validation error");
        };
        assert_eq!(
            serde_json::to_value(&errors).ok(),
            Some(json!({"non_field_errors": ["Expected a list of items but got type \"dict\"."]}))
        );
    }

    #[test]
    fn test_batch_items_names_scalar_type() {
        let Err(BulkError::Invalid(errors)) = batch_items(json!("x")) else {
            panic!("expected validation error");
        };
        assert_eq!(
            serde_json::to_value(&errors).ok(),
            Some(json!({"non_field_errors": ["Expected a list of items but got type \"str\"."]}))
        );
    }

    #[test]
    fn test_batch_items_accepts_array() {
        let items = batch_items(json!([{}, 5]));
        assert!(matches!(items, Ok(ref v) if v.len() == 2));
    }
}
