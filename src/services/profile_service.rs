//! Domain service for user profiles and role grants.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Role;
use crate::services::auth_service::UserInfo;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ProfileError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ProfileError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Editable fields of the caller's own profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileRequest {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// Profile as other users see it.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub username: String,
    pub role: Role,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub rating_count: u64,
    pub badge_count: u64,
    pub member_since: String,
}

#[async_trait::async_trait]
pub trait ProfileService: Send + Sync {
    /// Updates the caller's display name, bio and avatar.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Validation`] for over-long fields or a
    /// non-http(s) avatar URL.
    async fn update_profile(
        &self,
        user_id: i32,
        request: ProfileRequest,
    ) -> Result<UserInfo, ProfileError>;

    async fn public_profile(&self, username: &str) -> Result<PublicProfile, ProfileError>;

    async fn list_users(&self) -> Result<Vec<UserInfo>, ProfileError>;

    /// Grants `role` to the user.
    async fn set_role(&self, user_id: i32, role: Role) -> Result<UserInfo, ProfileError>;
}
