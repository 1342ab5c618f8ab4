//! Domain service for system-level status.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for SystemError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for SystemError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemCounts {
    pub users: u64,
    pub battlers: u64,
    pub ratings: u64,
    pub articles: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub counts: SystemCounts,
    pub last_analytics_refresh: Option<String>,
    pub news_enabled: bool,
    pub news_running: bool,
}

#[async_trait::async_trait]
pub trait SystemService: Send + Sync {
    /// Aggregates entity counts and the most recent analytics refresh.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::Database`] on connection failures.
    async fn get_status(
        &self,
        uptime_secs: u64,
        version: &str,
        news_running: bool,
    ) -> Result<SystemStatus, SystemError>;

    /// Liveness probe against the database.
    async fn ping(&self) -> Result<(), SystemError>;
}
