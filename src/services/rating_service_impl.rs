use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::repositories::analytics::RoleBreakdown;
use crate::db::{RatingEntry, Store, ToggleOutcome};
use crate::domain::scoring::{RoleAverage, display_score, round_score, weighted_score};
use crate::domain::{Actor, Category};
use crate::services::rating_service::{
    AttributeBreakdown, AttributeGroup, BadgeGroup, RatingError, RatingOutcome, RatingService,
    RatingSubmission, RoleContribution,
};

pub struct SeaOrmRatingService {
    store: Store,
    config: Arc<RwLock<Config>>,
}

impl SeaOrmRatingService {
    #[must_use]
    pub const fn new(store: Store, config: Arc<RwLock<Config>>) -> Self {
        Self { store, config }
    }

    async fn require_battler(&self, battler_id: i32) -> Result<(), RatingError> {
        if self.store.get_battler(battler_id).await?.is_none() {
            return Err(RatingError::BattlerNotFound(battler_id));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RatingService for SeaOrmRatingService {
    async fn attributes(&self) -> Result<Vec<AttributeGroup>, RatingError> {
        let attributes = self.store.catalog_repo().attributes().await?;

        Ok(Category::ALL
            .iter()
            .map(|category| AttributeGroup {
                category: *category,
                attributes: attributes
                    .iter()
                    .filter(|a| a.category == *category)
                    .cloned()
                    .collect(),
            })
            .collect())
    }

    async fn badges(&self) -> Result<Vec<BadgeGroup>, RatingError> {
        let badges = self.store.catalog_repo().badges().await?;

        Ok(Category::ALL
            .iter()
            .map(|category| {
                let (positive, negative) = badges
                    .iter()
                    .filter(|b| b.category == *category)
                    .cloned()
                    .partition(|b| b.is_positive);
                BadgeGroup {
                    category: *category,
                    positive,
                    negative,
                }
            })
            .collect())
    }

    async fn submit(
        &self,
        actor: &Actor,
        battler_id: i32,
        ratings: Vec<RatingSubmission>,
    ) -> Result<RatingOutcome, RatingError> {
        if ratings.is_empty() {
            return Err(RatingError::Validation(
                "At least one rating is required".to_string(),
            ));
        }

        let range = self.config.read().await.ratings.clone();
        if let Some(bad) = ratings.iter().find(|r| !range.is_valid_score(r.score)) {
            return Err(RatingError::Validation(format!(
                "Score {} for attribute {} is outside {}-{}",
                bad.score, bad.attribute_id, range.min_score, range.max_score
            )));
        }

        let known: HashSet<i32> = self
            .store
            .catalog_repo()
            .attributes()
            .await?
            .into_iter()
            .map(|a| a.id)
            .collect();
        if let Some(bad) = ratings.iter().find(|r| !known.contains(&r.attribute_id)) {
            return Err(RatingError::Validation(format!(
                "Unknown attribute {}",
                bad.attribute_id
            )));
        }

        self.require_battler(battler_id).await?;

        // Later entries for the same attribute win
        let mut entries: Vec<RatingEntry> = Vec::with_capacity(ratings.len());
        for rating in ratings {
            match entries
                .iter_mut()
                .find(|e| e.attribute_id == rating.attribute_id)
            {
                Some(existing) => existing.score = rating.score,
                None => entries.push(RatingEntry {
                    attribute_id: rating.attribute_id,
                    score: rating.score,
                }),
            }
        }

        let card = self
            .store
            .submit_ratings(actor.id, battler_id, &entries)
            .await?;

        metrics::counter!("ratings_submitted_total").increment(entries.len() as u64);

        Ok(RatingOutcome {
            battler_id,
            stored: entries.len(),
            writing: display_score(card.writing),
            performance: display_score(card.performance),
            personal: display_score(card.personal),
            total: display_score(card.total),
        })
    }

    async fn clear(&self, actor: &Actor, battler_id: i32) -> Result<u64, RatingError> {
        self.require_battler(battler_id).await?;
        Ok(self
            .store
            .rating_repo()
            .delete_for_user(actor.id, battler_id)
            .await?)
    }

    async fn breakdown(&self, battler_id: i32) -> Result<Vec<AttributeBreakdown>, RatingError> {
        self.require_battler(battler_id).await?;

        let weights = self.store.role_weights().await?;
        let attributes = self.store.catalog_repo().attributes().await?;
        let mut by_attribute = self
            .store
            .analytics_repo()
            .role_breakdown(battler_id)
            .await?;

        Ok(attributes
            .into_iter()
            .map(|attribute| {
                let rows = by_attribute.remove(&attribute.id).unwrap_or_default();
                let averages: Vec<RoleAverage> = rows
                    .iter()
                    .map(|r| RoleAverage {
                        role: r.role,
                        average: r.average,
                    })
                    .collect();

                AttributeBreakdown {
                    attribute_id: attribute.id,
                    name: attribute.name,
                    category: attribute.category,
                    rating_count: rows.iter().map(|r| r.rating_count).sum(),
                    weighted: weighted_score(&averages, &weights).map(round_score),
                    roles: rows
                        .into_iter()
                        .map(|breakdown| RoleContribution {
                            weight: weights.get(breakdown.role),
                            breakdown: RoleBreakdown {
                                average: round_score(breakdown.average),
                                ..breakdown
                            },
                        })
                        .collect(),
                }
            })
            .collect())
    }

    async fn toggle_badge(
        &self,
        actor: &Actor,
        battler_id: i32,
        badge_id: i32,
    ) -> Result<ToggleOutcome, RatingError> {
        self.require_battler(battler_id).await?;
        if !self.store.catalog_repo().badge_exists(badge_id).await? {
            return Err(RatingError::BadgeNotFound(badge_id));
        }

        let outcome = self
            .store
            .toggle_badge(actor.id, battler_id, badge_id)
            .await?;

        metrics::counter!("badge_toggles_total").increment(1);
        Ok(outcome)
    }
}
