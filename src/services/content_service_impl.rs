use crate::db::Store;
use crate::domain::{Actor, MediaKind};
use crate::models::content::{Article, ArticleInput, MediaInput, MediaItem};
use crate::services::content_service::{ContentError, ContentService};
use crate::services::validation::{is_http_url, normalize_optional};

pub struct SeaOrmContentService {
    store: Store,
}

impl SeaOrmContentService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    fn authorize(actor: &Actor) -> Result<(), ContentError> {
        if actor.role.can_manage_media() {
            Ok(())
        } else {
            Err(ContentError::Forbidden)
        }
    }

    async fn validate_media(&self, mut input: MediaInput) -> Result<MediaInput, ContentError> {
        input.title = input.title.trim().to_string();
        if input.title.is_empty() {
            return Err(ContentError::Validation("Title is required".to_string()));
        }

        input.url = input.url.trim().to_string();
        if !is_http_url(&input.url) {
            return Err(ContentError::Validation(
                "URL must be an http(s) URL".to_string(),
            ));
        }

        let kind: MediaKind = input
            .kind
            .trim()
            .to_ascii_lowercase()
            .parse()
            .map_err(ContentError::Validation)?;
        input.kind = kind.as_str().to_string();
        input.description = normalize_optional(input.description);

        if let Some(battler_id) = input.battler_id
            && self.store.get_battler(battler_id).await?.is_none()
        {
            return Err(ContentError::NotFound(format!("Battler {battler_id}")));
        }

        Ok(input)
    }

    fn validate_article(mut input: ArticleInput) -> Result<ArticleInput, ContentError> {
        input.title = input.title.trim().to_string();
        input.summary = input.summary.trim().to_string();
        if input.title.is_empty() || input.content.trim().is_empty() {
            return Err(ContentError::Validation(
                "Title and content are required".to_string(),
            ));
        }
        input.storyline = normalize_optional(input.storyline);
        input.tags = input
            .tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        Ok(input)
    }
}

#[async_trait::async_trait]
impl ContentService for SeaOrmContentService {
    async fn list_media(
        &self,
        battler_id: Option<i32>,
        kind: Option<&str>,
    ) -> Result<Vec<MediaItem>, ContentError> {
        Ok(self.store.media_repo().list(battler_id, kind).await?)
    }

    async fn create_media(
        &self,
        actor: &Actor,
        input: MediaInput,
    ) -> Result<MediaItem, ContentError> {
        Self::authorize(actor)?;
        let input = self.validate_media(input).await?;
        Ok(self.store.media_repo().create(&input, Some(actor.id)).await?)
    }

    async fn update_media(
        &self,
        actor: &Actor,
        id: i32,
        input: MediaInput,
    ) -> Result<MediaItem, ContentError> {
        Self::authorize(actor)?;
        let input = self.validate_media(input).await?;
        self.store
            .media_repo()
            .update(id, &input)
            .await?
            .ok_or_else(|| ContentError::NotFound(format!("Media {id}")))
    }

    async fn delete_media(&self, actor: &Actor, id: i32) -> Result<(), ContentError> {
        Self::authorize(actor)?;
        if self.store.media_repo().delete(id).await? {
            Ok(())
        } else {
            Err(ContentError::NotFound(format!("Media {id}")))
        }
    }

    async fn list_articles(&self, published_only: bool) -> Result<Vec<Article>, ContentError> {
        Ok(self.store.news_repo().list(published_only, None).await?)
    }

    async fn get_article(&self, id: i32, include_drafts: bool) -> Result<Article, ContentError> {
        self.store
            .news_repo()
            .get(id)
            .await?
            .filter(|a| include_drafts || a.published)
            .ok_or_else(|| ContentError::NotFound(format!("Article {id}")))
    }

    async fn create_article(&self, input: ArticleInput) -> Result<Article, ContentError> {
        let input = Self::validate_article(input)?;
        Ok(self.store.news_repo().create(&input).await?)
    }

    async fn update_article(&self, id: i32, input: ArticleInput) -> Result<Article, ContentError> {
        let input = Self::validate_article(input)?;
        self.store
            .news_repo()
            .update(id, &input)
            .await?
            .ok_or_else(|| ContentError::NotFound(format!("Article {id}")))
    }

    async fn set_published(&self, id: i32, published: bool) -> Result<Article, ContentError> {
        self.store
            .news_repo()
            .set_published(id, published)
            .await?
            .ok_or_else(|| ContentError::NotFound(format!("Article {id}")))
    }

    async fn delete_article(&self, id: i32) -> Result<(), ContentError> {
        if self.store.news_repo().delete(id).await? {
            Ok(())
        } else {
            Err(ContentError::NotFound(format!("Article {id}")))
        }
    }
}
