//! Domain service for battler profiles.
//!
//! Builds the list and detail view-models. Every score shown here is read
//! from the materialized score tables, never recomputed on the fly.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::db::BattlerBadgeCount;
use crate::db::repositories::tag::TagCount;
use crate::domain::{Actor, Category};
use crate::models::battler::{Battler, BattlerFilter, BattlerInput};
use crate::models::content::MediaItem;

#[derive(Debug, Error)]
pub enum BattlerError {
    #[error("Battler not found: {0}")]
    NotFound(i32),

    #[error("Your role cannot manage battlers")]
    Forbidden,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for BattlerError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for BattlerError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// List entry with the battler's aggregate score.
#[derive(Debug, Clone, Serialize)]
pub struct BattlerSummary {
    #[serde(flatten)]
    pub battler: Battler,
    pub tags: Vec<String>,
    pub total_score: f64,
    pub rating_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BattlerPage {
    pub items: Vec<BattlerSummary>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryScores {
    pub writing: f64,
    pub performance: f64,
    pub personal: f64,
    pub total: f64,
    pub rating_count: i64,
    pub rater_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttributeScore {
    pub attribute_id: i32,
    pub name: String,
    pub category: Category,
    pub score: f64,
    pub rating_count: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BadgeSummary {
    pub positive: Vec<BattlerBadgeCount>,
    pub negative: Vec<BattlerBadgeCount>,
    pub positive_total: i64,
    pub negative_total: i64,
}

/// The caller's own selections on a battler page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewerState {
    pub ratings: BTreeMap<i32, f64>,
    pub badges: Vec<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BattlerDetail {
    pub battler: Battler,
    pub tags: Vec<String>,
    pub scores: CategoryScores,
    pub attributes: Vec<AttributeScore>,
    pub badges: BadgeSummary,
    pub media: Vec<MediaItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer: Option<ViewerState>,
}

#[async_trait::async_trait]
pub trait BattlerService: Send + Sync {
    async fn list(&self, filter: &BattlerFilter) -> Result<BattlerPage, BattlerError>;

    /// Detail view-model; `viewer` adds the caller's own ratings and badges.
    async fn detail(&self, id: i32, viewer: Option<&Actor>) -> Result<BattlerDetail, BattlerError>;

    /// # Errors
    ///
    /// Returns [`BattlerError::Forbidden`] unless the actor may manage
    /// battlers, and [`BattlerError::Conflict`] when the name or slug exists.
    async fn create(&self, actor: &Actor, input: BattlerInput) -> Result<Battler, BattlerError>;

    async fn update(
        &self,
        actor: &Actor,
        id: i32,
        input: BattlerInput,
    ) -> Result<Battler, BattlerError>;

    async fn delete(&self, actor: &Actor, id: i32) -> Result<(), BattlerError>;

    async fn set_tags(
        &self,
        actor: &Actor,
        id: i32,
        tags: Vec<String>,
    ) -> Result<Vec<String>, BattlerError>;

    async fn list_tags(&self) -> Result<Vec<TagCount>, BattlerError>;

    /// Stores an uploaded picture and returns its public path.
    async fn set_image(
        &self,
        actor: &Actor,
        id: i32,
        content_type: Option<&str>,
        file_name: Option<&str>,
        bytes: &[u8],
    ) -> Result<String, BattlerError>;
}
