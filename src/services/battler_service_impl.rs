use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::db::Store;
use crate::db::repositories::battler::{DEFAULT_PAGE_SIZE, MAX_PAGE, MAX_PAGE_SIZE};
use crate::db::repositories::tag::TagCount;
use crate::domain::events::NotificationEvent;
use crate::domain::scoring::display_score;
use crate::domain::{Actor, slugify};
use crate::models::battler::{Battler, BattlerFilter, BattlerInput};
use crate::services::ImageService;
use crate::services::battler_service::{
    AttributeScore, BadgeSummary, BattlerDetail, BattlerError, BattlerPage, BattlerService,
    BattlerSummary, CategoryScores, ViewerState,
};
use crate::services::validation::normalize_optional;

const MAX_NAME_LEN: usize = 80;

pub struct SeaOrmBattlerService {
    store: Store,
    images: Arc<ImageService>,
    event_bus: broadcast::Sender<NotificationEvent>,
}

impl SeaOrmBattlerService {
    #[must_use]
    pub const fn new(
        store: Store,
        images: Arc<ImageService>,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> Self {
        Self {
            store,
            images,
            event_bus,
        }
    }

    fn authorize(actor: &Actor) -> Result<(), BattlerError> {
        if actor.role.can_manage_battlers() {
            Ok(())
        } else {
            Err(BattlerError::Forbidden)
        }
    }

    fn normalize(mut input: BattlerInput) -> Result<BattlerInput, BattlerError> {
        input.name = input.name.trim().to_string();
        if input.name.is_empty() || slugify(&input.name).is_empty() {
            return Err(BattlerError::Validation(
                "Name must contain at least one letter or digit".to_string(),
            ));
        }
        if input.name.chars().count() > MAX_NAME_LEN {
            return Err(BattlerError::Validation(format!(
                "Name must be at most {MAX_NAME_LEN} characters"
            )));
        }

        input.bio = normalize_optional(input.bio);
        input.location = normalize_optional(input.location);
        input.league = normalize_optional(input.league);
        Ok(input)
    }

    async fn require(&self, id: i32) -> Result<Battler, BattlerError> {
        self.store
            .get_battler(id)
            .await?
            .ok_or(BattlerError::NotFound(id))
    }
}

#[async_trait::async_trait]
impl BattlerService for SeaOrmBattlerService {
    async fn list(&self, filter: &BattlerFilter) -> Result<BattlerPage, BattlerError> {
        if filter.page.is_some_and(|page| page > MAX_PAGE) {
            return Err(BattlerError::Validation(format!(
                "page must be at most {MAX_PAGE}"
            )));
        }

        let (battlers, total) = self.store.list_battlers(filter).await?;

        let ids: Vec<i32> = battlers.iter().map(|b| b.id).collect();
        let scores = self.store.analytics_repo().battler_scores_for(&ids).await?;
        let mut tags = self.store.tag_repo().for_battlers(&ids).await?;

        let items = battlers
            .into_iter()
            .map(|battler| {
                let score = scores.get(&battler.id);
                BattlerSummary {
                    tags: tags.remove(&battler.id).unwrap_or_default(),
                    total_score: display_score(score.and_then(|s| s.total)),
                    rating_count: score.map_or(0, |s| s.rating_count),
                    battler,
                }
            })
            .collect();

        Ok(BattlerPage {
            items,
            total,
            page: filter.page.unwrap_or(1).max(1),
            per_page: filter
                .per_page
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        })
    }

    async fn detail(&self, id: i32, viewer: Option<&Actor>) -> Result<BattlerDetail, BattlerError> {
        let battler = self.require(id).await?;
        let analytics = self.store.analytics_repo();

        let tags = self.store.tag_repo().for_battler(id).await?;

        let scores = analytics
            .battler_score(id)
            .await?
            .map(|s| CategoryScores {
                writing: display_score(s.writing),
                performance: display_score(s.performance),
                personal: display_score(s.personal),
                total: display_score(s.total),
                rating_count: s.rating_count,
                rater_count: s.rater_count,
            })
            .unwrap_or_default();

        let attribute_scores = analytics.attribute_scores(id).await?;
        let attributes = self
            .store
            .catalog_repo()
            .attributes()
            .await?
            .into_iter()
            .map(|attribute| {
                let (score, rating_count) = attribute_scores
                    .get(&attribute.id)
                    .copied()
                    .unwrap_or((None, 0));
                AttributeScore {
                    attribute_id: attribute.id,
                    name: attribute.name,
                    category: attribute.category,
                    score: display_score(score),
                    rating_count,
                }
            })
            .collect();

        let mut badges = BadgeSummary::default();
        for count in self.store.badge_repo().counts_for_battler(id).await? {
            if count.is_positive {
                badges.positive_total += count.count;
                badges.positive.push(count);
            } else {
                badges.negative_total += count.count;
                badges.negative.push(count);
            }
        }
        badges.positive.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        badges.negative.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

        let media = self.store.media_repo().list(Some(id), None).await?;

        let viewer = match viewer {
            Some(actor) => Some(ViewerState {
                ratings: self.store.rating_repo().for_user(actor.id, id).await?,
                badges: self.store.badge_repo().for_user(actor.id, id).await?,
            }),
            None => None,
        };

        Ok(BattlerDetail {
            battler,
            tags,
            scores,
            attributes,
            badges,
            media,
            viewer,
        })
    }

    async fn create(&self, actor: &Actor, input: BattlerInput) -> Result<Battler, BattlerError> {
        Self::authorize(actor)?;
        let input = Self::normalize(input)?;

        if self.store.battler_repo().name_taken(&input.name, None).await? {
            return Err(BattlerError::Conflict(format!(
                "A battler named '{}' already exists",
                input.name
            )));
        }

        let battler = self.store.create_battler(&input, Some(actor.id)).await?;

        let _ = self.event_bus.send(NotificationEvent::BattlerCreated {
            battler_id: battler.id,
            name: battler.name.clone(),
        });

        Ok(battler)
    }

    async fn update(
        &self,
        actor: &Actor,
        id: i32,
        input: BattlerInput,
    ) -> Result<Battler, BattlerError> {
        Self::authorize(actor)?;
        let input = Self::normalize(input)?;

        if self
            .store
            .battler_repo()
            .name_taken(&input.name, Some(id))
            .await?
        {
            return Err(BattlerError::Conflict(format!(
                "A battler named '{}' already exists",
                input.name
            )));
        }

        self.store
            .update_battler(id, &input)
            .await?
            .ok_or(BattlerError::NotFound(id))
    }

    async fn delete(&self, actor: &Actor, id: i32) -> Result<(), BattlerError> {
        Self::authorize(actor)?;

        if !self.store.delete_battler(id).await? {
            return Err(BattlerError::NotFound(id));
        }

        if let Err(e) = self.images.remove_battler_image(id).await {
            warn!(battler_id = id, error = %e, "Failed to remove battler image");
        }

        info!(event = "battler_deleted", battler_id = id, by = %actor.username, "Deleted battler");
        let _ = self
            .event_bus
            .send(NotificationEvent::BattlerDeleted { battler_id: id });
        Ok(())
    }

    async fn set_tags(
        &self,
        actor: &Actor,
        id: i32,
        tags: Vec<String>,
    ) -> Result<Vec<String>, BattlerError> {
        Self::authorize(actor)?;
        self.require(id).await?;

        if tags.iter().any(|t| t.trim().chars().count() > 32) {
            return Err(BattlerError::Validation(
                "Tags must be at most 32 characters".to_string(),
            ));
        }

        Ok(self.store.tag_repo().replace_for_battler(id, &tags).await?)
    }

    async fn list_tags(&self) -> Result<Vec<TagCount>, BattlerError> {
        Ok(self.store.tag_repo().list_with_counts().await?)
    }

    async fn set_image(
        &self,
        actor: &Actor,
        id: i32,
        content_type: Option<&str>,
        file_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<String, BattlerError> {
        Self::authorize(actor)?;
        self.require(id).await?;

        let extension = ImageService::extension_for(content_type, file_name).ok_or_else(|| {
            BattlerError::Validation("Image must be PNG, JPEG or WebP".to_string())
        })?;

        let filename = self
            .images
            .save_battler_image(id, extension, bytes)
            .await
            .map_err(|e| BattlerError::Validation(e.to_string()))?;

        self.store.battler_repo().set_image(id, &filename).await?;
        Ok(format!("/images/{filename}"))
    }
}
