//! Generic single-record route handlers.
//!
//! List of the filtered collection plus retrieve, update, partial update and
//! destroy of one record addressed by `/:lookup`. Detail lookups honor the
//! query-string filter, so a record outside the filter is not found.

use axum::{extract::State, http::StatusCode, Json};
use bulkrest_core::{
    expected_dict_message, FieldErrors, FieldSet, FieldValue, Record, ValidationErrors,
};

use crate::{
    error::{ApiResult, BulkError},
    extractors::{Criteria, JsonBody, PathKey},
    services,
    state::ResourceState,
};

/// `GET /` - the filtered collection.
pub(crate) async fn list_route<R: Record>(
    State(state): State<ResourceState<R>>,
    Criteria(criteria): Criteria,
) -> ApiResult<Json<Vec<R>>> {
    let scope = services::load_scope(state.repo.as_ref(), &criteria).await?;
    Ok(Json(scope.filtered.to_vec()))
}

/// `GET /:lookup`
pub(crate) async fn retrieve_route<R: Record>(
    State(state): State<ResourceState<R>>,
    Criteria(criteria): Criteria,
    PathKey(key): PathKey,
) -> ApiResult<Json<R>> {
    let scope = services::load_scope(state.repo.as_ref(), &criteria).await?;
    let record = services::find_record(&scope, state.lookup_field(), &key)?;
    Ok(Json(record))
}

/// `PUT /:lookup`
pub(crate) async fn update_route<R: Record>(
    State(state): State<ResourceState<R>>,
    Criteria(criteria): Criteria,
    PathKey(key): PathKey,
    JsonBody(body): JsonBody,
) -> Result<Json<R>, BulkError> {
    update_one(state, criteria, key, object_body(body)?, false).await
}

/// `PATCH /:lookup`
pub(crate) async fn partial_update_route<R: Record>(
    State(state): State<ResourceState<R>>,
    Criteria(criteria): Criteria,
    PathKey(key): PathKey,
    JsonBody(body): JsonBody,
) -> Result<Json<R>, BulkError> {
    update_one(state, criteria, key, object_body(body)?, true).await
}

/// Detail updates take exactly one object.
fn object_body(body: FieldValue) -> Result<FieldSet, BulkError> {
    match body {
        FieldValue::Object(item) => Ok(item),
        other => Err(BulkError::Invalid(ValidationErrors::Item(FieldErrors::non_field(
            expected_dict_message(&other),
        )))),
    }
}

async fn update_one<R: Record>(
    state: ResourceState<R>,
    criteria: bulkrest_core::FilterCriteria,
    key: bulkrest_core::LookupKey,
    item: FieldSet,
    partial: bool,
) -> Result<Json<R>, BulkError> {
    let scope = services::load_scope(state.repo.as_ref(), &criteria).await?;
    let record = services::find_record(&scope, state.lookup_field(), &key)?;
    let updated = services::update_record(
        state.repo.as_ref(),
        state.validator.as_ref(),
        &record,
        &item,
        partial,
    )
    .await?;
    Ok(Json(updated))
}

/// `DELETE /:lookup`
pub(crate) async fn destroy_route<R: Record>(
    State(state): State<ResourceState<R>>,
    Criteria(criteria): Criteria,
    PathKey(key): PathKey,
) -> ApiResult<StatusCode> {
    let scope = services::load_scope(state.repo.as_ref(), &criteria).await?;
    let record = services::find_record(&scope, state.lookup_field(), &key)?;
    services::destroy_record(state.repo.as_ref(), state.hooks.as_ref(), &record).await?;
    Ok(StatusCode::NO_CONTENT)
}
