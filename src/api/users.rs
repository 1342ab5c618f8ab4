use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::{ApiError, ApiResponse, AppState};
use crate::services::{ProfileRequest, PublicProfile, UserInfo};

/// PUT /profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Json(request): Json<ProfileRequest>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let user = state
        .shared
        .profile_service
        .update_profile(actor.id, request)
        .await?;
    Ok(Json(ApiResponse::success(user)))
}

/// GET /users/{username}
pub async fn public_profile(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<PublicProfile>>, ApiError> {
    let profile = state
        .shared
        .profile_service
        .public_profile(username.trim())
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}
