use tracing::info;

use crate::db::{ProfileUpdate, Store};
use crate::domain::Role;
use crate::services::auth_service::UserInfo;
use crate::services::profile_service::{
    ProfileError, ProfileRequest, ProfileService, PublicProfile,
};
use crate::services::validation::{is_http_url, normalize_optional};

const MAX_DISPLAY_NAME: usize = 64;
const MAX_BIO: usize = 2000;

pub struct SeaOrmProfileService {
    store: Store,
}

impl SeaOrmProfileService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl ProfileService for SeaOrmProfileService {
    async fn update_profile(
        &self,
        user_id: i32,
        request: ProfileRequest,
    ) -> Result<UserInfo, ProfileError> {
        let display_name = normalize_optional(request.display_name);
        let bio = normalize_optional(request.bio);
        let avatar_url = normalize_optional(request.avatar_url);

        if display_name
            .as_ref()
            .is_some_and(|n| n.chars().count() > MAX_DISPLAY_NAME)
        {
            return Err(ProfileError::Validation(format!(
                "Display name must be at most {MAX_DISPLAY_NAME} characters"
            )));
        }

        if bio.as_ref().is_some_and(|b| b.chars().count() > MAX_BIO) {
            return Err(ProfileError::Validation(format!(
                "Bio must be at most {MAX_BIO} characters"
            )));
        }

        if let Some(url) = &avatar_url
            && !is_http_url(url)
        {
            return Err(ProfileError::Validation(
                "Avatar URL must be an http(s) URL".to_string(),
            ));
        }

        let user = self
            .store
            .user_repo()
            .update_profile(
                user_id,
                ProfileUpdate {
                    display_name,
                    bio,
                    avatar_url,
                },
            )
            .await?
            .ok_or_else(|| ProfileError::NotFound(user_id.to_string()))?;

        Ok(UserInfo::from(user))
    }

    async fn public_profile(&self, username: &str) -> Result<PublicProfile, ProfileError> {
        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| ProfileError::NotFound(username.to_string()))?;

        let rating_count = self.store.rating_repo().count_by_user(user.id).await?;
        let badge_count = self.store.badge_repo().count_by_user(user.id).await?;

        Ok(PublicProfile {
            username: user.username,
            role: user.role,
            display_name: user.display_name,
            bio: user.bio,
            avatar_url: user.avatar_url,
            rating_count,
            badge_count,
            member_since: user.created_at,
        })
    }

    async fn list_users(&self) -> Result<Vec<UserInfo>, ProfileError> {
        let users = self.store.user_repo().list().await?;
        Ok(users.into_iter().map(UserInfo::from).collect())
    }

    async fn set_role(&self, user_id: i32, role: Role) -> Result<UserInfo, ProfileError> {
        let user = self
            .store
            .user_repo()
            .set_role(user_id, role)
            .await?
            .ok_or_else(|| ProfileError::NotFound(user_id.to_string()))?;

        // The user's existing ratings now count under the new role
        self.store.refresh_analytics().await?;

        info!(event = "role_granted", user_id, role = %role, "Granted role");
        Ok(UserInfo::from(user))
    }
}
