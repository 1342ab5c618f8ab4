use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::validate_id;
use super::{ActionResult, ApiError, ApiResponse, AppState};
use crate::db::ToggleOutcome;
use crate::services::RatingSubmission;
use crate::services::rating_service::{
    AttributeBreakdown, AttributeGroup, BadgeGroup, RatingOutcome,
};

#[derive(Debug, Deserialize)]
pub struct SubmitRatingsRequest {
    pub ratings: Vec<RatingSubmission>,
}

/// GET /attributes
pub async fn list_attributes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<AttributeGroup>>>, ApiError> {
    let groups = state.shared.rating_service.attributes().await?;
    Ok(Json(ApiResponse::success(groups)))
}

/// GET /badges
pub async fn list_badges(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<BadgeGroup>>>, ApiError> {
    let groups = state.shared.rating_service.badges().await?;
    Ok(Json(ApiResponse::success(groups)))
}

/// PUT /battlers/{id}/ratings
pub async fn submit_ratings(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<SubmitRatingsRequest>,
) -> Result<Json<ApiResponse<RatingOutcome>>, ApiError> {
    let id = validate_id("battler", id)?;
    let outcome = state
        .shared
        .rating_service
        .submit(&actor, id, request.ratings)
        .await?;
    Ok(Json(ApiResponse::success(outcome)))
}

/// DELETE /battlers/{id}/ratings
pub async fn clear_ratings(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ActionResult>>, ApiError> {
    let id = validate_id("battler", id)?;
    let removed = state.shared.rating_service.clear(&actor, id).await?;
    Ok(Json(ApiResponse::action(format!("Removed {removed} ratings"))))
}

/// GET /battlers/{id}/ratings/breakdown
pub async fn rating_breakdown(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<AttributeBreakdown>>>, ApiError> {
    let id = validate_id("battler", id)?;
    let breakdown = state.shared.rating_service.breakdown(id).await?;
    Ok(Json(ApiResponse::success(breakdown)))
}

/// POST /battlers/{id}/badges/{badge_id}/toggle
pub async fn toggle_badge(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Path((id, badge_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<ToggleOutcome>>, ApiError> {
    let id = validate_id("battler", id)?;
    let badge_id = validate_id("badge", badge_id)?;
    let outcome = state
        .shared
        .rating_service
        .toggle_badge(&actor, id, badge_id)
        .await?;
    Ok(Json(ApiResponse::success(outcome)))
}
