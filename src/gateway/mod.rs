//! HTTP gateway (Axum) for cache search, store and delete.
//!
//! Every `/v1/cache/*` response uses the [`ApiResponse`] envelope and echoes
//! `X-Request-ID`. `/healthz` is a bare liveness probe for orchestrators.

pub mod envelope;
pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

pub use envelope::{ApiCode, ApiResponse, ErrorDetail, REQUEST_ID_HEADER, RequestId};
pub use error::GatewayError;
pub use handler::{
    batch_delete_handler, cache_health_handler, delete_handler, get_handler, search_handler,
    store_handler,
};
pub use state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/v1/cache/search", post(search_handler))
        .route("/v1/cache/store", post(store_handler))
        .route("/v1/cache/health", get(cache_health_handler))
        .route("/v1/cache/batch", delete(batch_delete_handler))
        .route("/v1/cache/{id}", get(get_handler).delete(delete_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}
