//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::Config;
use crate::db::{Store, User};
use crate::domain::Role;
use crate::services::auth_service::{AuthError, AuthService, LoginResult, is_valid_username};

pub struct SeaOrmAuthService {
    store: Store,
    config: Arc<RwLock<Config>>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, config: Arc<RwLock<Config>>) -> Self {
        Self { store, config }
    }
}

#[async_trait::async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let security = self.config.read().await.security.clone();

        if !security.registration_enabled {
            return Err(AuthError::RegistrationDisabled);
        }

        let username = username.trim();
        if !is_valid_username(username) {
            return Err(AuthError::Validation(
                "Username must be 3-32 characters of letters, digits, '_' or '-'".to_string(),
            ));
        }

        if password.len() < security.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                security.min_password_length
            )));
        }

        if self.store.get_user_by_username(username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let user = self
            .store
            .user_repo()
            .create(username, password, Role::Fan, &security)
            .await?;

        info!(event = "user_registered", user_id = user.id, username = %user.username, "Registered user");
        Ok(LoginResult::from(user))
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let is_valid = self.store.verify_user_password(username, password).await?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(LoginResult::from(user))
    }

    async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>, AuthError> {
        Ok(self.store.verify_api_key(api_key).await?)
    }

    async fn get_user(&self, username: &str) -> Result<User, AuthError> {
        self.store
            .get_user_by_username(username)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let security = self.config.read().await.security.clone();

        if new_password.len() < security.min_password_length {
            return Err(AuthError::Validation(format!(
                "New password must be at least {} characters",
                security.min_password_length
            )));
        }

        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let is_valid = self
            .store
            .verify_user_password(username, current_password)
            .await?;

        if !is_valid {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .user_repo()
            .update_password(username, new_password, &security)
            .await?;

        Ok(())
    }

    async fn get_api_key(&self, username: &str) -> Result<String, AuthError> {
        self.store
            .user_repo()
            .get_api_key(username)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn regenerate_api_key(&self, username: &str) -> Result<String, AuthError> {
        Ok(self.store.user_repo().regenerate_api_key(username).await?)
    }
}
