//! System status and health endpoints.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::services::SystemStatus;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
}

/// `GET /api/system/status`
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let status = state
        .shared
        .system_service
        .get_status(
            state.start_time.elapsed().as_secs(),
            env!("CARGO_PKG_VERSION"),
            state.shared.news_service.is_running(),
        )
        .await?;

    Ok(Json(ApiResponse::success(status)))
}

/// `GET /api/health`
///
/// Unauthenticated liveness probe; answers 503 when the database is down.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let database = state.shared.system_service.ping().await.is_ok();
    let (status, label) = if database {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(ApiResponse::success(HealthResponse {
            status: label,
            database,
        })),
    )
        .into_response()
}
