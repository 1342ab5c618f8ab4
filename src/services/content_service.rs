//! Domain service for media content and news articles.

use thiserror::Error;

use crate::domain::Actor;
use crate::models::content::{Article, ArticleInput, MediaInput, MediaItem};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Your role cannot manage media")]
    Forbidden,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ContentError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ContentError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait ContentService: Send + Sync {
    async fn list_media(
        &self,
        battler_id: Option<i32>,
        kind: Option<&str>,
    ) -> Result<Vec<MediaItem>, ContentError>;

    /// # Errors
    ///
    /// Returns [`ContentError::Forbidden`] for fans and battlers, and
    /// [`ContentError::Validation`] for a non-http(s) URL or unknown kind.
    async fn create_media(&self, actor: &Actor, input: MediaInput)
    -> Result<MediaItem, ContentError>;

    async fn update_media(
        &self,
        actor: &Actor,
        id: i32,
        input: MediaInput,
    ) -> Result<MediaItem, ContentError>;

    async fn delete_media(&self, actor: &Actor, id: i32) -> Result<(), ContentError>;

    async fn list_articles(&self, published_only: bool) -> Result<Vec<Article>, ContentError>;

    /// Unpublished articles are only visible when `include_drafts` is set.
    async fn get_article(&self, id: i32, include_drafts: bool) -> Result<Article, ContentError>;

    async fn create_article(&self, input: ArticleInput) -> Result<Article, ContentError>;

    async fn update_article(&self, id: i32, input: ArticleInput) -> Result<Article, ContentError>;

    async fn set_published(&self, id: i32, published: bool) -> Result<Article, ContentError>;

    async fn delete_article(&self, id: i32) -> Result<(), ContentError>;
}
