//! Path extractor for record lookup keys.
//!
//! `PathKey` reads the `:lookup` segment of a detail route as a
//! [`LookupKey`]. Keys are compared in their canonical text form, so the
//! segment `12` matches a record whose integer key is 12.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bulkrest_core::LookupKey;

/// Lookup key taken from the request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathKey(pub LookupKey);

/// Error returned when PathKey extraction fails.
#[derive(Debug)]
pub struct PathKeyError {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for PathKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid lookup key in '{}': {}", self.path, self.message)
    }
}

impl std::error::Error for PathKeyError {}

impl IntoResponse for PathKeyError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": "invalid_path_parameter",
            "message": self.to_string(),
            "path": self.path,
        });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for PathKey
where
    S: Send + Sync,
{
    type Rejection = PathKeyError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| PathKeyError {
                path: parts.uri.path().to_string(),
                message: e.to_string(),
            })?;

        if raw.is_empty() {
            return Err(PathKeyError {
                path: parts.uri.path().to_string(),
                message: "lookup key is empty".to_string(),
            });
        }

        Ok(PathKey(LookupKey::new(raw)))
    }
}
