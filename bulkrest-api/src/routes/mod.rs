//! REST API Routes
//!
//! `resource_router` mounts the handlers of one resource according to its
//! [`BulkActions`]; `create_api_router` nests resources under their paths
//! and adds the HTTP tracing layer.

use axum::{
    routing::{get, MethodRouter},
    Router,
};
use bulkrest_core::{BulkActions, Record};
use tower_http::trace::TraceLayer;

use crate::state::ResourceState;

pub mod bulk;
pub mod generic;

// ============================================================================
// RESOURCE ROUTER
// ============================================================================

/// Build the router for one resource.
///
/// # Routes Created
///
/// - `GET /` - List the filtered collection (`LIST`)
/// - `POST /` - Create one record or a batch (`CREATE`)
/// - `PUT /` - Bulk update (`UPDATE`)
/// - `PATCH /` - Partial bulk update (`UPDATE`)
/// - `DELETE /` - Bulk destroy of the filtered collection (`DESTROY`)
/// - `GET|PUT|PATCH|DELETE /:lookup` - Single-record operations (`DETAIL`)
///
/// Methods that are not enabled answer 405.
pub fn resource_router<R: Record>(state: ResourceState<R>, actions: BulkActions) -> Router {
    let mut router = Router::new();

    if actions.has_collection_routes() {
        let mut collection: MethodRouter<ResourceState<R>> = MethodRouter::new();
        if actions.contains(BulkActions::LIST) {
            collection = collection.get(generic::list_route::<R>);
        }
        if actions.contains(BulkActions::CREATE) {
            collection = collection.post(bulk::create_route::<R>);
        }
        if actions.contains(BulkActions::UPDATE) {
            collection = collection
                .put(bulk::bulk_update_route::<R>)
                .patch(bulk::partial_bulk_update_route::<R>);
        }
        if actions.contains(BulkActions::DESTROY) {
            collection = collection.delete(bulk::bulk_destroy_route::<R>);
        }
        router = router.route("/", collection);
    }

    if actions.contains(BulkActions::DETAIL) {
        router = router.route(
            "/:lookup",
            get(generic::retrieve_route::<R>)
                .put(generic::update_route::<R>)
                .patch(generic::partial_update_route::<R>)
                .delete(generic::destroy_route::<R>),
        );
    }

    tracing::debug!(
        resource = R::RESOURCE_NAME,
        actions = ?actions,
        "Mounted resource routes"
    );
    router.with_state(state)
}

// ============================================================================
// API ROUTER
// ============================================================================

/// Nest resource routers under their mount paths and add request tracing.
///
/// # Example
///
/// ```ignore
/// let app = create_api_router(vec![
///     ("/simple", resource_router(simple_state, BulkActions::all())),
/// ]);
/// ```
pub fn create_api_router<P>(resources: impl IntoIterator<Item = (P, Router)>) -> Router
where
    P: AsRef<str>,
{
    let router = resources
        .into_iter()
        .fold(Router::new(), |router, (path, resource)| {
            router.nest(path.as_ref(), resource)
        });
    router.layer(TraceLayer::new_for_http())
}
