use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, header},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::{CurrentUser, MaybeUser};
use super::validation::{optional_query, validate_id};
use super::{ActionResult, ApiError, ApiResponse, AppState};
use crate::db::repositories::tag::TagCount;
use crate::models::battler::{Battler, BattlerFilter, BattlerInput};
use crate::services::{BattlerDetail, BattlerPage};

#[derive(Debug, Deserialize)]
pub struct TagsRequest {
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub image_path: String,
}

/// GET /battlers?search=&tag=&page=&per_page=
pub async fn list_battlers(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<BattlerFilter>,
) -> Result<Json<ApiResponse<BattlerPage>>, ApiError> {
    let filter = BattlerFilter {
        search: optional_query(filter.search),
        tag: optional_query(filter.tag),
        ..filter
    };
    let page = state.shared.battler_service.list(&filter).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// GET /battlers/{id}
/// Authenticated callers also get their own ratings and badge picks.
pub async fn get_battler(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<BattlerDetail>>, ApiError> {
    let id = validate_id("battler", id)?;
    let detail = state
        .shared
        .battler_service
        .detail(id, viewer.as_ref())
        .await?;
    Ok(Json(ApiResponse::success(detail)))
}

/// POST /battlers
pub async fn create_battler(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Json(input): Json<BattlerInput>,
) -> Result<Json<ApiResponse<Battler>>, ApiError> {
    let battler = state.shared.battler_service.create(&actor, input).await?;
    Ok(Json(ApiResponse::success(battler)))
}

/// PUT /battlers/{id}
pub async fn update_battler(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i32>,
    Json(input): Json<BattlerInput>,
) -> Result<Json<ApiResponse<Battler>>, ApiError> {
    let id = validate_id("battler", id)?;
    let battler = state
        .shared
        .battler_service
        .update(&actor, id, input)
        .await?;
    Ok(Json(ApiResponse::success(battler)))
}

/// DELETE /battlers/{id}
pub async fn delete_battler(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ActionResult>>, ApiError> {
    let id = validate_id("battler", id)?;
    state.shared.battler_service.delete(&actor, id).await?;
    Ok(Json(ApiResponse::action(format!("Battler {id} deleted"))))
}

/// PUT /battlers/{id}/tags
pub async fn set_tags(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<TagsRequest>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let id = validate_id("battler", id)?;
    let tags = state
        .shared
        .battler_service
        .set_tags(&actor, id, request.tags)
        .await?;
    Ok(Json(ApiResponse::success(tags)))
}

/// GET /tags
pub async fn list_tags(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<TagCount>>>, ApiError> {
    let tags = state.shared.battler_service.list_tags().await?;
    Ok(Json(ApiResponse::success(tags)))
}

/// PUT /battlers/{id}/image
/// The raw request body is the picture; `Content-Type` selects the format and
/// an optional `X-File-Name` header helps when the type is generic.
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i32>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<ImageResponse>>, ApiError> {
    let id = validate_id("battler", id)?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let file_name = headers.get("X-File-Name").and_then(|v| v.to_str().ok());

    let image_path = state
        .shared
        .battler_service
        .set_image(&actor, id, content_type, file_name, &body)
        .await?;
    Ok(Json(ApiResponse::success(ImageResponse { image_path })))
}
