use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use super::auth::CurrentUser;
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState};
use crate::db::RefreshReport;
use crate::domain::Role;
use crate::domain::events::NotificationEvent;
use crate::services::UserInfo;
use crate::services::analytics_service::RoleWeightView;

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

fn parse_role(value: &str) -> Result<Role, ApiError> {
    value
        .parse()
        .map_err(|_| ApiError::validation(format!("Unknown role '{value}'")))
}

/// GET /admin/role-weights
pub async fn get_role_weights(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<RoleWeightView>>, ApiError> {
    let weights = state.shared.analytics_service.role_weights().await?;
    Ok(Json(ApiResponse::success(RoleWeightView::from(&weights))))
}

/// PUT /admin/role-weights
/// Body is a partial map such as `{"media": 2.5}`.
pub async fn update_role_weights(
    State(state): State<Arc<AppState>>,
    CurrentUser(_): CurrentUser,
    Json(changes): Json<BTreeMap<String, f64>>,
) -> Result<Json<ApiResponse<RoleWeightView>>, ApiError> {
    if changes.is_empty() {
        return Err(ApiError::validation("No role weights given"));
    }
    let changes = changes
        .into_iter()
        .map(|(role, weight)| Ok((parse_role(&role)?, weight)))
        .collect::<Result<BTreeMap<_, _>, ApiError>>()?;

    let weights = state
        .shared
        .analytics_service
        .update_role_weights(changes)
        .await?;

    Ok(Json(ApiResponse::success(RoleWeightView::from(&weights))))
}

/// POST /admin/role-weights/reset
pub async fn reset_role_weights(
    State(state): State<Arc<AppState>>,
    CurrentUser(_): CurrentUser,
) -> Result<Json<ApiResponse<RoleWeightView>>, ApiError> {
    let weights = state.shared.analytics_service.reset_role_weights().await?;

    let _ = state.event_bus().send(NotificationEvent::Info {
        message: "Role weights reset to defaults".to_string(),
    });
    Ok(Json(ApiResponse::success(RoleWeightView::from(&weights))))
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserInfo>>>, ApiError> {
    let users = state.shared.profile_service.list_users().await?;
    Ok(Json(ApiResponse::success(users)))
}

/// PUT /admin/users/{id}/role
pub async fn set_user_role(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<i32>,
    Json(request): Json<RoleRequest>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let id = validate_id("user", id)?;
    let role = parse_role(&request.role)?;
    if id == actor.id && role != Role::Admin {
        return Err(ApiError::validation("Administrators cannot demote themselves"));
    }

    let user = state.shared.profile_service.set_role(id, role).await?;

    info!(
        event = "role_granted",
        user_id = id,
        role = %role,
        granted_by = actor.id,
        "Role granted"
    );
    let _ = state.event_bus().send(NotificationEvent::Info {
        message: format!("{} is now {}", user.username, role),
    });
    Ok(Json(ApiResponse::success(user)))
}

/// POST /admin/analytics/refresh
pub async fn refresh_analytics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<RefreshReport>>, ApiError> {
    let report = state.shared.analytics_service.refresh().await?;
    Ok(Json(ApiResponse::success(report)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role("league_owner").unwrap(), Role::LeagueOwner);
        assert!(parse_role("superuser").is_err());
    }
}
