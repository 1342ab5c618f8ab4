use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tracing::info;

use crate::config::Config;
use crate::db::Store;
use crate::db::repositories::analytics::{
    BadgeFrequency, DistributionBucket, RefreshReport, RefreshStatus, RoleActivity, score_for,
};
use crate::domain::events::NotificationEvent;
use crate::domain::scoring::{display_score, is_valid_weight};
use crate::domain::{Role, RoleWeights};
use crate::services::analytics_service::{
    AnalyticsError, AnalyticsService, HomeFeed, LeaderboardEntry, LeaderboardQuery,
};

const HOME_TOP: u64 = 5;
const HOME_NEWEST: u64 = 6;
const HOME_NEWS: u64 = 5;
const HOME_MEDIA: u64 = 6;

pub struct SeaOrmAnalyticsService {
    store: Store,
    config: Arc<RwLock<Config>>,
    event_bus: broadcast::Sender<NotificationEvent>,
}

impl SeaOrmAnalyticsService {
    #[must_use]
    pub const fn new(
        store: Store,
        config: Arc<RwLock<Config>>,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> Self {
        Self {
            store,
            config,
            event_bus,
        }
    }
}

#[async_trait::async_trait]
impl AnalyticsService for SeaOrmAnalyticsService {
    async fn refresh(&self) -> Result<RefreshReport, AnalyticsError> {
        let report = self.store.refresh_analytics().await?;

        metrics::histogram!("analytics_refresh_duration_seconds")
            .record(report.duration_ms as f64 / 1000.0);

        let _ = self.event_bus.send(NotificationEvent::AnalyticsRefreshed {
            views: report.views.len(),
            duration_ms: report.duration_ms,
        });

        Ok(report)
    }

    async fn status(&self) -> Result<Vec<RefreshStatus>, AnalyticsError> {
        Ok(self.store.analytics_repo().refresh_status().await?)
    }

    async fn leaderboard(
        &self,
        query: &LeaderboardQuery,
    ) -> Result<Vec<LeaderboardEntry>, AnalyticsError> {
        let (default_min, default_limit) = {
            let config = self.config.read().await;
            (
                config.analytics.leaderboard_min_ratings,
                config.analytics.leaderboard_size,
            )
        };

        let min_ratings = i64::from(query.min_ratings.unwrap_or(default_min));
        let limit = query.limit.unwrap_or(default_limit).clamp(1, 500);

        let ranked = self
            .store
            .analytics_repo()
            .ranked(query.category, min_ratings, limit)
            .await?;

        Ok(ranked
            .into_iter()
            .enumerate()
            .map(|(index, (row, name))| LeaderboardEntry {
                rank: index + 1,
                battler_id: row.battler_id,
                name,
                score: display_score(score_for(&row, query.category)),
                writing: display_score(row.writing),
                performance: display_score(row.performance),
                personal: display_score(row.personal),
                total: display_score(row.total),
                rating_count: row.rating_count,
                rater_count: row.rater_count,
            })
            .collect())
    }

    async fn badge_frequency(&self) -> Result<Vec<BadgeFrequency>, AnalyticsError> {
        Ok(self.store.analytics_repo().badge_frequency().await?)
    }

    async fn rating_distribution(
        &self,
        attribute_id: Option<i32>,
    ) -> Result<Vec<DistributionBucket>, AnalyticsError> {
        Ok(self
            .store
            .analytics_repo()
            .rating_distribution(attribute_id)
            .await?)
    }

    async fn role_activity(&self) -> Result<Vec<RoleActivity>, AnalyticsError> {
        Ok(self.store.analytics_repo().role_activity().await?)
    }

    async fn home(&self) -> Result<HomeFeed, AnalyticsError> {
        let top_battlers = self
            .leaderboard(&LeaderboardQuery {
                limit: Some(HOME_TOP),
                ..LeaderboardQuery::default()
            })
            .await?;

        Ok(HomeFeed {
            news: self.store.news_repo().list(true, Some(HOME_NEWS)).await?,
            top_battlers,
            newest_battlers: self.store.battler_repo().newest(HOME_NEWEST).await?,
            recent_media: self.store.media_repo().recent(HOME_MEDIA).await?,
        })
    }

    async fn role_weights(&self) -> Result<RoleWeights, AnalyticsError> {
        Ok(self.store.role_weights().await?)
    }

    async fn update_role_weights(
        &self,
        changes: BTreeMap<Role, f64>,
    ) -> Result<RoleWeights, AnalyticsError> {
        if let Some((role, weight)) = changes.iter().find(|(_, w)| !is_valid_weight(**w)) {
            return Err(AnalyticsError::Validation(format!(
                "Weight for {role} must be a finite number >= 0, got {weight}"
            )));
        }

        let mut weights = self.store.role_weights().await?;
        for (role, weight) in &changes {
            weights.set(*role, *weight);
        }

        let stored = self.store.role_weight_repo().save(&weights).await?;
        info!(event = "role_weights_updated", changed = changes.len(), "Updated role weights");

        self.refresh().await?;
        Ok(stored)
    }

    async fn reset_role_weights(&self) -> Result<RoleWeights, AnalyticsError> {
        let stored = self.store.role_weight_repo().reset().await?;
        info!(event = "role_weights_reset", "Reset role weights to defaults");

        self.refresh().await?;
        Ok(stored)
    }
}
