use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::{optional_query, validate_id};
use super::{ActionResult, ApiError, ApiResponse, AppState};
use crate::models::content::{MediaInput, MediaItem};

#[derive(Debug, Default, Deserialize)]
pub struct MediaParams {
    pub battler_id: Option<i32>,
    pub kind: Option<String>,
}

/// GET /media?battler_id=&kind=
pub async fn list_media(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MediaParams>,
) -> Result<Json<ApiResponse<Vec<MediaItem>>>, ApiError> {
    let kind = optional_query(params.kind);
    let items = state
        .shared
        .content_service
        .list_media(params.battler_id, kind.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(items)))
}

/// POST /media
pub async fn create_media(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Json(input): Json<MediaInput>,
) -> Result<Json<ApiResponse<MediaItem>>, ApiError> {
    let item = state
        .shared
        .content_service
        .create_media(&actor, input)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

/// PUT /media/{id}
pub async fn update_media(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i32>,
    Json(input): Json<MediaInput>,
) -> Result<Json<ApiResponse<MediaItem>>, ApiError> {
    let id = validate_id("media", id)?;
    let item = state
        .shared
        .content_service
        .update_media(&actor, id, input)
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

/// DELETE /media/{id}
pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ActionResult>>, ApiError> {
    let id = validate_id("media", id)?;
    state.shared.content_service.delete_media(&actor, id).await?;
    Ok(Json(ApiResponse::action(format!("Media item {id} deleted"))))
}
