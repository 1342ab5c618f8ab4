//! Domain service for analytics views, the leaderboard and role weights.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::db::repositories::analytics::{
    BadgeFrequency, DistributionBucket, RefreshReport, RefreshStatus, RoleActivity,
};
use crate::domain::{Category, Role, RoleWeights};
use crate::models::battler::Battler;
use crate::models::content::{Article, MediaItem};

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AnalyticsError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AnalyticsError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub battler_id: i32,
    pub name: String,
    pub score: f64,
    pub writing: f64,
    pub performance: f64,
    pub personal: f64,
    pub total: f64,
    pub rating_count: i64,
    pub rater_count: i64,
}

#[derive(Debug, Clone, Default)]
pub struct LeaderboardQuery {
    pub category: Option<Category>,
    pub min_ratings: Option<u32>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HomeFeed {
    pub news: Vec<Article>,
    pub top_battlers: Vec<LeaderboardEntry>,
    pub newest_battlers: Vec<Battler>,
    pub recent_media: Vec<MediaItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleWeightView {
    pub weights: BTreeMap<Role, f64>,
    pub defaults: BTreeMap<Role, f64>,
}

impl From<&RoleWeights> for RoleWeightView {
    fn from(weights: &RoleWeights) -> Self {
        Self {
            weights: weights.iter().collect(),
            defaults: RoleWeights::defaults().iter().collect(),
        }
    }
}

#[async_trait::async_trait]
pub trait AnalyticsService: Send + Sync {
    /// Rebuilds every materialized view.
    async fn refresh(&self) -> Result<RefreshReport, AnalyticsError>;

    async fn status(&self) -> Result<Vec<RefreshStatus>, AnalyticsError>;

    /// Ranked battlers; ties break on rating count, then name.
    async fn leaderboard(
        &self,
        query: &LeaderboardQuery,
    ) -> Result<Vec<LeaderboardEntry>, AnalyticsError>;

    async fn badge_frequency(&self) -> Result<Vec<BadgeFrequency>, AnalyticsError>;

    async fn rating_distribution(
        &self,
        attribute_id: Option<i32>,
    ) -> Result<Vec<DistributionBucket>, AnalyticsError>;

    async fn role_activity(&self) -> Result<Vec<RoleActivity>, AnalyticsError>;

    async fn home(&self) -> Result<HomeFeed, AnalyticsError>;

    async fn role_weights(&self) -> Result<RoleWeights, AnalyticsError>;

    /// Applies a partial weight map and refreshes every weighted score.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::Validation`] for negative or non-finite
    /// weights; nothing is stored then.
    async fn update_role_weights(
        &self,
        changes: BTreeMap<Role, f64>,
    ) -> Result<RoleWeights, AnalyticsError>;

    /// Restores the default weights and refreshes every weighted score.
    async fn reset_role_weights(&self) -> Result<RoleWeights, AnalyticsError>;
}
