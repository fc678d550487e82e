//! bulkrest API - Bulk REST Operations over Axum
//!
//! Mounts create, list, bulk update and bulk destroy routes for any
//! [`Record`](bulkrest_core::Record) type backed by a
//! [`Repository`](bulkrest_storage::Repository).
//!
//! # Example
//!
//! ```ignore
//! let state = ResourceState::new(InMemoryRepository::<SimpleModel>::default(), simple_schema(), BulkConfig::default());
//! let app = create_api_router([("/simple", resource_router(state, BulkActions::all()))]);
//! ```

pub mod config;
pub mod error;
pub mod extractors;
pub mod hooks;
pub mod routes;
pub mod services;
pub mod simple;
pub mod state;
pub mod telemetry;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, BulkError, ErrorCode};
pub use hooks::{allow_bulk_destroy, BulkHooks, NoopHooks};
pub use routes::{create_api_router, resource_router};
pub use services::{BulkUpdate, Created, Scope, UpdateOptions};
pub use simple::{simple_schema, SimpleModel};
pub use state::ResourceState;
pub use telemetry::{init_tracing, LogFormat, TelemetryConfig};
