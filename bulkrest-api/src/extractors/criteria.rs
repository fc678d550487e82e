//! Query-string filter extractor.
//!
//! Every query parameter becomes an equality predicate on the field of the
//! same name. An empty query string yields empty criteria, which the routes
//! treat as "no filter applied".

use std::collections::BTreeMap;

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bulkrest_core::FilterCriteria;

/// Filter criteria taken from the query string.
#[derive(Debug, Clone, Default)]
pub struct Criteria(pub FilterCriteria);

#[derive(Debug)]
pub struct CriteriaError {
    pub message: String,
}

impl std::fmt::Display for CriteriaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid filter query: {}", self.message)
    }
}

impl std::error::Error for CriteriaError {}

impl IntoResponse for CriteriaError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": "invalid_query",
            "message": self.to_string(),
        });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Criteria
where
    S: Send + Sync,
{
    type Rejection = CriteriaError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params): Query<BTreeMap<String, String>> =
            Query::from_request_parts(parts, state)
                .await
                .map_err(|e| CriteriaError {
                    message: e.body_text(),
                })?;
        Ok(Criteria(FilterCriteria::from(params)))
    }
}
