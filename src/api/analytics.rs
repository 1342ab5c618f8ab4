use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_id, validate_limit};
use super::{ApiError, ApiResponse, AppState};
use crate::db::RefreshStatus;
use crate::db::repositories::analytics::{BadgeFrequency, DistributionBucket, RoleActivity};
use crate::domain::Category;
use crate::services::LeaderboardQuery;
use crate::services::analytics_service::{HomeFeed, LeaderboardEntry};

#[derive(Debug, Default, Deserialize)]
pub struct LeaderboardParams {
    pub category: Option<Category>,
    pub min_ratings: Option<u32>,
    pub limit: Option<u64>,
}

impl LeaderboardParams {
    fn into_query(self) -> Result<LeaderboardQuery, ApiError> {
        Ok(LeaderboardQuery {
            category: self.category,
            min_ratings: self.min_ratings,
            limit: self.limit.map(validate_limit).transpose()?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DistributionParams {
    pub attribute_id: Option<i32>,
}

/// GET /leaderboard?category=&min_ratings=&limit=
pub async fn leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<ApiResponse<Vec<LeaderboardEntry>>>, ApiError> {
    let entries = state
        .shared
        .analytics_service
        .leaderboard(&params.into_query()?)
        .await?;
    Ok(Json(ApiResponse::success(entries)))
}

/// GET /analytics/top-battlers?limit=&category=
pub async fn top_battlers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<ApiResponse<Vec<LeaderboardEntry>>>, ApiError> {
    let query = LeaderboardQuery {
        limit: Some(params.limit.unwrap_or(10)),
        ..params.into_query()?
    };
    let entries = state.shared.analytics_service.leaderboard(&query).await?;
    Ok(Json(ApiResponse::success(entries)))
}

/// GET /home
pub async fn home(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<HomeFeed>>, ApiError> {
    let feed = state.shared.analytics_service.home().await?;
    Ok(Json(ApiResponse::success(feed)))
}

/// GET /analytics/badges
pub async fn badge_frequency(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<BadgeFrequency>>>, ApiError> {
    let rows = state.shared.analytics_service.badge_frequency().await?;
    Ok(Json(ApiResponse::success(rows)))
}

/// GET /analytics/rating-distribution?attribute_id=
pub async fn rating_distribution(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DistributionParams>,
) -> Result<Json<ApiResponse<Vec<DistributionBucket>>>, ApiError> {
    let attribute_id = params
        .attribute_id
        .map(|id| validate_id("attribute", id))
        .transpose()?;
    let rows = state
        .shared
        .analytics_service
        .rating_distribution(attribute_id)
        .await?;
    Ok(Json(ApiResponse::success(rows)))
}

/// GET /analytics/role-activity
pub async fn role_activity(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<RoleActivity>>>, ApiError> {
    let rows = state.shared.analytics_service.role_activity().await?;
    Ok(Json(ApiResponse::success(rows)))
}

/// GET /analytics/status
pub async fn refresh_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<RefreshStatus>>>, ApiError> {
    let rows = state.shared.analytics_service.status().await?;
    Ok(Json(ApiResponse::success(rows)))
}
