//! `SeaORM` implementation of the `SystemService` trait.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::Store;
use crate::services::system_service::{SystemCounts, SystemError, SystemService, SystemStatus};

pub struct SeaOrmSystemService {
    store: Store,
    config: Arc<RwLock<Config>>,
}

impl SeaOrmSystemService {
    #[must_use]
    pub const fn new(store: Store, config: Arc<RwLock<Config>>) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl SystemService for SeaOrmSystemService {
    async fn get_status(
        &self,
        uptime_secs: u64,
        version: &str,
        news_running: bool,
    ) -> Result<SystemStatus, SystemError> {
        let user_repo = self.store.user_repo();
        let battler_repo = self.store.battler_repo();
        let rating_repo = self.store.rating_repo();
        let news_repo = self.store.news_repo();
        let analytics_repo = self.store.analytics_repo();
        let (users, battlers, ratings, articles, last_refresh) = tokio::try_join!(
            user_repo.count(),
            battler_repo.count(),
            rating_repo.count(),
            news_repo.count(),
            analytics_repo.last_refresh(),
        )?;

        Ok(SystemStatus {
            version: version.to_string(),
            uptime: uptime_secs,
            counts: SystemCounts {
                users,
                battlers,
                ratings,
                articles,
            },
            last_analytics_refresh: last_refresh,
            news_enabled: self.config.read().await.news.enabled,
            news_running,
        })
    }

    async fn ping(&self) -> Result<(), SystemError> {
        self.store.ping().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_status_counts_seeded_admin() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let service = SeaOrmSystemService::new(store, Arc::new(RwLock::new(Config::default())));

        let status = service.get_status(42, "0.1.0", false).await.unwrap();

        assert_eq!(status.uptime, 42);
        assert_eq!(status.counts.users, 1);
        assert_eq!(status.counts.battlers, 0);
        assert!(status.last_analytics_refresh.is_none());
        assert!(service.ping().await.is_ok());
    }
}
