use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::store::SimilarityStore;

pub mod model;
pub mod products;
pub mod recommendations;

/// Shared application state
///
/// The store is loaded once at startup and never mutated, so handlers read
/// it through a plain `Arc` without locking.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SimilarityStore>,
    /// Top-N applied when a request does not specify one
    pub default_top_n: usize,
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::list))
        .route("/model", get(model::info))
        .route("/recommendations", get(recommendations::recommend))
        .route("/recommendations/export", get(recommendations::export))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Span for each request, tagged with a generated request id
fn make_request_span(request: &Request<Body>) -> tracing::Span {
    let request_id = Uuid::new_v4();
    tracing::info_span!(
        "request",
        %request_id,
        method = %request.method(),
        uri = %request.uri(),
    )
}
