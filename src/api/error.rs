use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::services::{
    AnalyticsError, AuthError, BattlerError, ContentError, NewsError, ProfileError, RatingError,
    SystemError,
};

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),

    DatabaseError(String),

    ExternalApiError { service: String, message: String },

    ValidationError(String),

    Conflict(String),

    InternalError(String),

    Unauthorized(String),

    Forbidden(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::ExternalApiError { service, message } => {
                write!(f, "{service} error: {message}")
            }
            Self::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::InternalError(msg) => write!(f, "Internal error: {msg}"),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::DatabaseError(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            Self::ExternalApiError { service, message } => {
                tracing::warn!("{} API error: {}", service, message);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("{service} service is unavailable"),
                )
            }
            Self::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid credentials".to_string()),
            AuthError::UserNotFound => Self::Unauthorized("User not found".to_string()),
            AuthError::UsernameTaken => Self::Conflict("Username already taken".to_string()),
            AuthError::RegistrationDisabled => Self::Forbidden(err.to_string()),
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::NotFound(who) => Self::not_found("User", who),
            ProfileError::Validation(msg) => Self::validation(msg),
            ProfileError::Database(msg) => Self::DatabaseError(msg),
            ProfileError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<BattlerError> for ApiError {
    fn from(err: BattlerError) -> Self {
        match err {
            BattlerError::NotFound(id) => Self::not_found("Battler", id),
            BattlerError::Forbidden => Self::Forbidden(err.to_string()),
            BattlerError::Conflict(msg) => Self::Conflict(msg),
            BattlerError::Validation(msg) => Self::validation(msg),
            BattlerError::Database(msg) => Self::DatabaseError(msg),
            BattlerError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<RatingError> for ApiError {
    fn from(err: RatingError) -> Self {
        match err {
            RatingError::BattlerNotFound(id) => Self::not_found("Battler", id),
            RatingError::BadgeNotFound(id) => Self::not_found("Badge", id),
            RatingError::Validation(msg) => Self::validation(msg),
            RatingError::Database(msg) => Self::DatabaseError(msg),
            RatingError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::Validation(msg) => Self::validation(msg),
            AnalyticsError::Database(msg) => Self::DatabaseError(msg),
            AnalyticsError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            ContentError::Forbidden => Self::Forbidden(err.to_string()),
            ContentError::Validation(msg) => Self::validation(msg),
            ContentError::Database(msg) => Self::DatabaseError(msg),
            ContentError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<NewsError> for ApiError {
    fn from(err: NewsError) -> Self {
        match err {
            NewsError::Disabled | NewsError::NoAccounts => Self::validation(err.to_string()),
            NewsError::AlreadyRunning => Self::Conflict(err.to_string()),
            NewsError::Llm { .. } | NewsError::Source { .. } | NewsError::InvalidResponse { .. } => {
                Self::ExternalApiError {
                    service: "News pipeline".to_string(),
                    message: err.to_string(),
                }
            }
            NewsError::Database(msg) => Self::DatabaseError(msg),
            NewsError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<SystemError> for ApiError {
    fn from(err: SystemError) -> Self {
        match err {
            SystemError::Database(msg) => Self::DatabaseError(msg),
            SystemError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl ApiError {
    pub fn not_found(resource: &str, id: impl fmt::Display) -> Self {
        Self::NotFound(format!("{resource} {id} not found"))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_errors_map_to_status_codes() {
        let cases = [
            (ApiError::from(BattlerError::Forbidden), StatusCode::FORBIDDEN),
            (ApiError::from(BattlerError::NotFound(3)), StatusCode::NOT_FOUND),
            (
                ApiError::from(RatingError::Validation("x".into())),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::from(AuthError::UsernameTaken), StatusCode::CONFLICT),
            (
                ApiError::from(AuthError::InvalidCredentials),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ApiError::from(NewsError::InvalidResponse { phase: 2 }),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
