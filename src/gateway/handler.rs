use std::time::Instant;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::Response,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::facade::{DeleteRequest, DeleteResult};
use crate::pipeline::{QueryOutcome, QueryRequest, StoreOutcome, WriteRequest};
use crate::vectordb::Payload;

use super::envelope::{ApiResponse, RequestId};
use super::error::GatewayError;
use super::state::AppState;

fn reply<T: Serialize>(
    request_id: &RequestId,
    result: Result<T, GatewayError>,
    message: &str,
) -> Response {
    match result {
        Ok(data) => ApiResponse::ok(data, message, request_id).into_response_with_status(StatusCode::OK),
        Err(e) => e.into_response_with_id(request_id),
    }
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, GatewayError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| GatewayError::Validation(e.body_text()))
}

fn require_non_empty(field: &str, value: Option<&str>) -> Result<String, GatewayError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| GatewayError::Validation(format!("{} is required", field)))
}

/// `POST /v1/cache/search`
#[instrument(skip(state, payload), fields(request_id = request_id.as_str()))]
pub async fn search_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let result: Result<QueryOutcome, GatewayError> = async {
        let request = json_body(payload)?;
        Ok::<_, GatewayError>(state.query.query(&request).await?)
    }
    .await;

    if let Ok(outcome) = &result {
        info!(
            hit = outcome.is_hit(),
            duration_ms = started.elapsed().as_millis() as u64,
            "cache query handled"
        );
    }
    reply(&request_id, result, "cache query succeeded")
}

/// `POST /v1/cache/store`
///
/// A quality rejection is still a 200; the body's `data.success` is `false`.
#[instrument(skip(state, payload), fields(request_id = request_id.as_str()))]
pub async fn store_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    payload: Result<Json<WriteRequest>, JsonRejection>,
) -> Response {
    let started = Instant::now();
    let result: Result<StoreOutcome, GatewayError> = async {
        let request = json_body(payload)?;
        Ok::<_, GatewayError>(state.store.store(&request).await?)
    }
    .await;

    if let Ok(outcome) = &result {
        info!(
            stored = outcome.is_stored(),
            cache_id = outcome.cache_id(),
            duration_ms = started.elapsed().as_millis() as u64,
            "cache store handled"
        );
    }
    reply(&request_id, result, "cache store processed")
}

#[derive(Debug, Default, Deserialize)]
pub struct EntryParams {
    pub user_type: Option<String>,
    pub force: Option<String>,
}

/// `GET /v1/cache/{id}?user_type=`
#[instrument(skip(state, params), fields(request_id = request_id.as_str()))]
pub async fn get_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<String>,
    params: Result<Query<EntryParams>, QueryRejection>,
) -> Response {
    let result: Result<Payload, GatewayError> = async {
        let Query(params) = params.map_err(|e| GatewayError::Validation(e.body_text()))?;
        require_non_empty("user_type", params.user_type.as_deref())?;
        Ok::<_, GatewayError>(state.deleter.get_by_id(&id).await?)
    }
    .await;

    reply(&request_id, result, "cache entry found")
}

/// `DELETE /v1/cache/{id}?user_type=&force=`
#[instrument(skip(state, params), fields(request_id = request_id.as_str()))]
pub async fn delete_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<String>,
    params: Result<Query<EntryParams>, QueryRejection>,
) -> Response {
    let result: Result<DeleteResult, GatewayError> = async {
        let Query(params) = params.map_err(|e| GatewayError::Validation(e.body_text()))?;
        let user_type = require_non_empty("user_type", params.user_type.as_deref())?;
        let force = params.force.as_deref() == Some("true");
        state.deleter.delete_single(&id, &user_type, force).await?;
        Ok::<_, GatewayError>(DeleteResult {
            success: true,
            deleted_count: 1,
            ..Default::default()
        })
    }
    .await;

    reply(&request_id, result, "cache entry deleted")
}

/// `DELETE /v1/cache/batch`
///
/// Partial failure is reported in `data.failed_ids`, not as an HTTP error.
#[instrument(skip(state, payload), fields(request_id = request_id.as_str()))]
pub async fn batch_delete_handler(
    State(state): State<AppState>,
    request_id: RequestId,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> Response {
    let result: Result<DeleteResult, GatewayError> = async {
        let request = json_body(payload)?;
        if request.ids.is_empty() {
            return Err(GatewayError::Validation("cache_ids is required".to_string()));
        }
        require_non_empty("user_type", Some(&request.user_type))?;
        Ok::<_, GatewayError>(state.deleter.delete(&request).await)
    }
    .await;

    reply(&request_id, result, "batch delete processed")
}

#[derive(Debug, Serialize)]
pub struct CacheHealth {
    pub status: &'static str,
    pub backend: &'static str,
    pub cache_ttl_secs: u64,
    pub max_cache_size: u64,
    pub timestamp: i64,
}

/// `GET /v1/cache/health`: probes the vector store.
#[instrument(skip(state), fields(request_id = request_id.as_str()))]
pub async fn cache_health_handler(State(state): State<AppState>, request_id: RequestId) -> Response {
    let result = match state.deleter.health_check().await {
        Ok(()) => Ok(CacheHealth {
            status: "healthy",
            backend: state.backend.backend_name(),
            cache_ttl_secs: state.cache_ttl.as_secs(),
            max_cache_size: state.max_cache_size,
            timestamp: chrono::Utc::now().timestamp(),
        }),
        Err(e) => Err(GatewayError::Unavailable(e.to_string())),
    };

    reply(&request_id, result, "service healthy")
}
