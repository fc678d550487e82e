//! bulkrest API Server Entry Point
//!
//! Serves the sample resource from an in-memory repository at `/simple`.

use axum::Router;
use bulkrest_api::{
    create_api_router, init_tracing, resource_router, simple_schema, ApiConfig, ApiError,
    ApiResult, ResourceState, SimpleModel, TelemetryConfig,
};
use bulkrest_core::{BulkActions, BulkConfig};
use bulkrest_storage::InMemoryRepository;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let telemetry_config = TelemetryConfig::from_env()?;
    init_tracing(&telemetry_config)?;

    let api_config = ApiConfig::from_env()?;
    let bulk_config = BulkConfig::from_env()?;

    let repo = InMemoryRepository::<SimpleModel>::new(bulk_config.lookup_field.clone());
    let state = ResourceState::new(repo, simple_schema(), bulk_config);
    let app: Router = create_api_router([(
        "/simple",
        resource_router(state, BulkActions::LIST_BULK_CREATE_UPDATE_DESTROY),
    )]);

    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, "Starting bulkrest API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
