//! Shared helpers for driving a router in-process.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

/// Response status and decoded JSON body (`Value::Null` when empty).
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Send one request through `app` and decode the response.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> Result<TestResponse, String> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .map_err(|e| format!("Failed to build request: {}", e))?;
    dispatch(app, request).await
}

/// Send a JSON-labelled body verbatim, valid JSON or not.
#[allow(dead_code)]
pub async fn send_raw(
    app: Router,
    method: Method,
    uri: &str,
    body: &'static str,
) -> Result<TestResponse, String> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .map_err(|e| format!("Failed to build request: {}", e))?;
    dispatch(app, request).await
}

async fn dispatch(app: Router, request: Request<Body>) -> Result<TestResponse, String> {
    let response = app
        .oneshot(request)
        .await
        .map_err(|e| format!("Request failed: {}", e))?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| format!("Failed to read body: {}", e))?;

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).map_err(|e| format!("Body is not JSON: {}", e))?
    };
    Ok(TestResponse { status, body })
}
