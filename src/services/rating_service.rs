//! Domain service for attribute ratings and badge assignments.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{Attribute, Badge, ToggleOutcome};
use crate::db::repositories::analytics::RoleBreakdown;
use crate::domain::{Actor, Category};

#[derive(Debug, Error)]
pub enum RatingError {
    #[error("Battler not found: {0}")]
    BattlerNotFound(i32),

    #[error("Badge not found: {0}")]
    BadgeNotFound(i32),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for RatingError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for RatingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RatingSubmission {
    pub attribute_id: i32,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttributeGroup {
    pub category: Category,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BadgeGroup {
    pub category: Category,
    pub positive: Vec<Badge>,
    pub negative: Vec<Badge>,
}

/// Aggregate scores of a battler right after a rating write.
#[derive(Debug, Clone, Serialize)]
pub struct RatingOutcome {
    pub battler_id: i32,
    pub stored: usize,
    pub writing: f64,
    pub performance: f64,
    pub personal: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleContribution {
    #[serde(flatten)]
    pub breakdown: RoleBreakdown,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttributeBreakdown {
    pub attribute_id: i32,
    pub name: String,
    pub category: Category,
    pub roles: Vec<RoleContribution>,
    pub rating_count: i64,
    /// Weighted overall across roles, or `None` when no weight applies.
    pub weighted: Option<f64>,
}

#[async_trait::async_trait]
pub trait RatingService: Send + Sync {
    async fn attributes(&self) -> Result<Vec<AttributeGroup>, RatingError>;

    async fn badges(&self) -> Result<Vec<BadgeGroup>, RatingError>;

    /// Upserts the caller's ratings for a battler.
    ///
    /// # Errors
    ///
    /// Returns [`RatingError::Validation`] for an empty submission, a score
    /// outside the configured range, or an unknown attribute. Nothing is
    /// stored in that case.
    async fn submit(
        &self,
        actor: &Actor,
        battler_id: i32,
        ratings: Vec<RatingSubmission>,
    ) -> Result<RatingOutcome, RatingError>;

    /// Removes the caller's ratings for a battler.
    async fn clear(&self, actor: &Actor, battler_id: i32) -> Result<u64, RatingError>;

    async fn breakdown(&self, battler_id: i32) -> Result<Vec<AttributeBreakdown>, RatingError>;

    /// Adds the badge when the caller has not assigned it, removes it otherwise.
    async fn toggle_badge(
        &self,
        actor: &Actor,
        battler_id: i32,
        badge_id: i32,
    ) -> Result<ToggleOutcome, RatingError>;
}
