use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;

use super::{ActionResult, ApiError, ApiResponse, AppState};
use crate::domain::{Actor, Role};
use crate::services::{LoginResult, UserInfo};

const SESSION_USER_KEY: &str = "user";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Serialize)]
pub struct ApiKeyResponse {
    pub api_key: String,
}

// ============================================================================
// Extractors
// ============================================================================

/// The authenticated caller. Rejects with 401 when the request carries no
/// valid session or API key.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Actor);

/// The caller when authenticated, `None` for anonymous requests.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Actor>);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .map(Self)
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Actor>().cloned()))
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the caller and stores it as a request extension. Checks:
/// 1. Session cookie (from login)
/// 2. `X-Api-Key` header
/// 3. `Authorization: Bearer <api_key>` header
///
/// Anonymous requests pass through untouched.
pub async fn identify(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(actor) = resolve_actor(&state, &session, request.headers()).await {
        tracing::Span::current().record("user_id", actor.id);
        request.extensions_mut().insert(actor);
    }
    next.run(request).await
}

async fn resolve_actor(state: &AppState, session: &Session, headers: &HeaderMap) -> Option<Actor> {
    // The role is re-read on every request so grants apply immediately
    if let Ok(Some(username)) = session.get::<String>(SESSION_USER_KEY).await
        && let Ok(user) = state.shared.auth_service.get_user(&username).await
    {
        return Some(user.actor());
    }

    let key = extract_api_key(headers)?;
    match state.shared.auth_service.verify_api_key(&key).await {
        Ok(Some(user)) => Some(user.actor()),
        _ => None,
    }
}

fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}

pub async fn require_user(request: Request, next: Next) -> Result<Response, ApiError> {
    if request.extensions().get::<Actor>().is_none() {
        return Err(ApiError::Unauthorized("Not authenticated".to_string()));
    }
    Ok(next.run(request).await)
}

pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    match request.extensions().get::<Actor>() {
        None => Err(ApiError::Unauthorized("Not authenticated".to_string())),
        Some(actor) if actor.role != Role::Admin => {
            Err(ApiError::forbidden("Administrator role required"))
        }
        Some(_) => Ok(next.run(request).await),
    }
}

// ============================================================================
// Handlers
// ============================================================================

fn validate_credentials(payload: &CredentialsRequest) -> Result<(), ApiError> {
    if payload.username.trim().is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }
    Ok(())
}

async fn start_session(session: &Session, username: &str) -> Result<(), ApiError> {
    session
        .insert(SESSION_USER_KEY, username)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))
}

/// POST /auth/register
/// Creates a fan account and signs it in.
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    validate_credentials(&payload)?;

    let result = state
        .shared
        .auth_service
        .register(payload.username.trim(), &payload.password)
        .await?;
    start_session(&session, &result.username).await?;

    tracing::info!(event = "user_registered", user_id = result.id, "User registered");
    Ok(Json(ApiResponse::success(result)))
}

/// POST /auth/login
/// Authenticate with username and password, returns API key on success
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    validate_credentials(&payload)?;

    let result = state
        .shared
        .auth_service
        .login(payload.username.trim(), &payload.password)
        .await?;
    start_session(&session, &result.username).await?;

    Ok(Json(ApiResponse::success(result)))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Json<ApiResponse<ActionResult>> {
    let _ = session.flush().await;
    Json(ApiResponse::action("Logged out"))
}

/// GET /auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let user = state.shared.auth_service.get_user(&actor.username).await?;
    Ok(Json(ApiResponse::success(UserInfo::from(user))))
}

/// PUT /auth/password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<ActionResult>>, ApiError> {
    state
        .shared
        .auth_service
        .change_password(
            &actor.username,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;

    tracing::info!(event = "password_changed", user_id = actor.id, "Password changed");
    Ok(Json(ApiResponse::action("Password updated successfully")))
}

/// GET /auth/api-key
pub async fn get_api_key(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<ApiResponse<ApiKeyResponse>>, ApiError> {
    let api_key = state
        .shared
        .auth_service
        .get_api_key(&actor.username)
        .await?;
    Ok(Json(ApiResponse::success(ApiKeyResponse { api_key })))
}

/// POST /auth/api-key/regenerate
pub async fn regenerate_api_key(
    State(state): State<Arc<AppState>>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<ApiResponse<ApiKeyResponse>>, ApiError> {
    let api_key = state
        .shared
        .auth_service
        .regenerate_api_key(&actor.username)
        .await?;

    tracing::info!(event = "api_key_regenerated", user_id = actor.id, "API key regenerated");
    Ok(Json(ApiResponse::success(ApiKeyResponse { api_key })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_api_key_sources() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_api_key(&headers), None);

        headers.insert("Authorization", HeaderValue::from_static("Bearer  abc "));
        assert_eq!(extract_api_key(&headers).as_deref(), Some("abc"));

        headers.insert("X-Api-Key", HeaderValue::from_static("xyz"));
        assert_eq!(extract_api_key(&headers).as_deref(), Some("xyz"));
    }
}
