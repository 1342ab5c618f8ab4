use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::{RoleWeights, ScoreCard};
use crate::models::battler::{Battler, BattlerFilter, BattlerInput};

pub mod migrator;
pub mod repositories;

pub use repositories::analytics::{RefreshReport, RefreshStatus};
pub use repositories::badge::{BattlerBadgeCount, ToggleOutcome};
pub use repositories::catalog::{Attribute, Badge};
pub use repositories::rating::RatingEntry;
pub use repositories::user::{ProfileUpdate, User};

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let in_memory = db_url.contains(":memory:");
        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // Every pooled connection to an in-memory database is its own database
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(false);
        if !in_memory {
            opt.max_lifetime(Duration::from_secs(600));
        }

        let conn = Database::connect(opt).await?;

        conn.execute_unprepared("PRAGMA foreign_keys = ON").await?;
        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn battler_repo(&self) -> repositories::battler::BattlerRepository {
        repositories::battler::BattlerRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn tag_repo(&self) -> repositories::tag::TagRepository {
        repositories::tag::TagRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn catalog_repo(&self) -> repositories::catalog::CatalogRepository {
        repositories::catalog::CatalogRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn rating_repo(&self) -> repositories::rating::RatingRepository {
        repositories::rating::RatingRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn badge_repo(&self) -> repositories::badge::BadgeRepository {
        repositories::badge::BadgeRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn role_weight_repo(&self) -> repositories::role_weight::RoleWeightRepository {
        repositories::role_weight::RoleWeightRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn analytics_repo(&self) -> repositories::analytics::AnalyticsRepository {
        repositories::analytics::AnalyticsRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn media_repo(&self) -> repositories::media::MediaRepository {
        repositories::media::MediaRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn news_repo(&self) -> repositories::news::NewsRepository {
        repositories::news::NewsRepository::new(self.conn.clone())
    }

    // ========== Battlers ==========

    pub async fn list_battlers(&self, filter: &BattlerFilter) -> Result<(Vec<Battler>, u64)> {
        self.battler_repo().list(filter).await
    }

    pub async fn get_battler(&self, id: i32) -> Result<Option<Battler>> {
        self.battler_repo().get(id).await
    }

    pub async fn create_battler(
        &self,
        input: &BattlerInput,
        created_by: Option<i32>,
    ) -> Result<Battler> {
        let battler = self.battler_repo().create(input, created_by).await?;
        self.tag_repo()
            .replace_for_battler(battler.id, &input.tags)
            .await?;
        self.analytics_repo().refresh_battler(battler.id).await?;
        Ok(battler)
    }

    pub async fn update_battler(&self, id: i32, input: &BattlerInput) -> Result<Option<Battler>> {
        let Some(battler) = self.battler_repo().update(id, input).await? else {
            return Ok(None);
        };
        self.tag_repo().replace_for_battler(id, &input.tags).await?;
        Ok(Some(battler))
    }

    pub async fn delete_battler(&self, id: i32) -> Result<bool> {
        self.battler_repo().delete(id).await
    }

    // ========== Ratings & badges ==========

    pub async fn submit_ratings(
        &self,
        user_id: i32,
        battler_id: i32,
        entries: &[RatingEntry],
    ) -> Result<ScoreCard> {
        self.rating_repo()
            .upsert_many(user_id, battler_id, entries)
            .await
    }

    pub async fn toggle_badge(
        &self,
        user_id: i32,
        battler_id: i32,
        badge_id: i32,
    ) -> Result<ToggleOutcome> {
        self.badge_repo().toggle(user_id, battler_id, badge_id).await
    }

    // ========== Role weights & analytics ==========

    pub async fn role_weights(&self) -> Result<RoleWeights> {
        self.role_weight_repo().load().await
    }

    pub async fn refresh_analytics(&self) -> Result<RefreshReport> {
        self.analytics_repo().refresh_all().await
    }

    // ========== Users ==========

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn verify_user_password(&self, username: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(username, password).await
    }

    pub async fn verify_api_key(&self, api_key: &str) -> Result<Option<User>> {
        self.user_repo().verify_api_key(api_key).await
    }
}
