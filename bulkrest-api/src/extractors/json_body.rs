//! Request body extractor.
//!
//! Bodies are decoded as plain JSON and classified by the routes, so a batch
//! holding non-object entries still reaches validation. Bodies that are not
//! JSON at all are rejected with a JSON 400 instead of axum's text response.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bulkrest_core::FieldValue;

/// Any JSON request body.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBody(pub FieldValue);

/// Error returned when the body is missing, not JSON, or not labelled JSON.
#[derive(Debug)]
pub struct JsonBodyError {
    pub message: String,
}

impl std::fmt::Display for JsonBodyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid request body: {}", self.message)
    }
}

impl std::error::Error for JsonBodyError {}

impl From<JsonRejection> for JsonBodyError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for JsonBodyError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": "invalid_body",
            "message": self.to_string(),
        });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = JsonBodyError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<FieldValue>::from_request(req, state).await?;
        Ok(JsonBody(value))
    }
}
