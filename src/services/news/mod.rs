//! LLM news generation: prompts, fenced JSON extraction, the six-phase
//! pipeline, and the service that runs it and persists the result.

pub mod extract;
pub mod pipeline;
pub mod prompts;

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use thiserror::Error;
use tokio::sync::{RwLock, broadcast};
use tracing::{error, info};

use crate::clients::{LanguageModel, SocialSource, VideoSource};
use crate::config::Config;
use crate::db::Store;
use crate::domain::events::NotificationEvent;
use crate::models::content::Article;
pub use pipeline::{NewsPipeline, PipelineOutput, PipelineSettings};

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("News generation is disabled")]
    Disabled,

    #[error("A news generation run is already in progress")]
    AlreadyRunning,

    #[error("No social accounts configured")]
    NoAccounts,

    #[error("Phase {phase}: language model request failed: {message}")]
    Llm { phase: u8, message: String },

    #[error("Phase {phase}: response did not contain a fenced JSON block of the expected shape")]
    InvalidResponse { phase: u8 },

    #[error("Phase {phase}: source request failed: {message}")]
    Source { phase: u8, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for NewsError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for NewsError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsRunReport {
    pub articles: Vec<Article>,
    pub accounts_analyzed: usize,
    pub videos_summarized: usize,
    pub duration_ms: u64,
}

#[async_trait::async_trait]
pub trait NewsService: Send + Sync {
    /// Runs the pipeline once and stores every generated article unpublished.
    async fn generate(&self) -> Result<NewsRunReport, NewsError>;

    fn is_running(&self) -> bool;
}

pub struct PipelineNewsService {
    store: Store,
    config: Arc<RwLock<Config>>,
    llm: Arc<dyn LanguageModel>,
    social: Arc<dyn SocialSource>,
    video: Arc<dyn VideoSource>,
    event_bus: broadcast::Sender<NotificationEvent>,
    running: AtomicBool,
}

impl PipelineNewsService {
    #[must_use]
    pub fn new(
        store: Store,
        config: Arc<RwLock<Config>>,
        llm: Arc<dyn LanguageModel>,
        social: Arc<dyn SocialSource>,
        video: Arc<dyn VideoSource>,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> Self {
        Self {
            store,
            config,
            llm,
            social,
            video,
            event_bus,
            running: AtomicBool::new(false),
        }
    }

    async fn run_pipeline(&self) -> Result<NewsRunReport, NewsError> {
        let settings = {
            let config = self.config.read().await;
            if !config.news.enabled {
                return Err(NewsError::Disabled);
            }
            PipelineSettings {
                accounts: config.news.accounts.clone(),
                posts_per_account: config.news.posts_per_account,
                video_search_limit: config.news.video_search_limit,
                max_additional_accounts: config.news.max_additional_accounts,
            }
        };

        let started = Instant::now();
        let output = NewsPipeline::new(
            self.llm.clone(),
            self.social.clone(),
            self.video.clone(),
            settings,
        )
        .with_event_bus(self.event_bus.clone())
        .run()
        .await?;

        let articles = self
            .store
            .news_repo()
            .insert_generated(&output.articles)
            .await?;

        Ok(NewsRunReport {
            articles,
            accounts_analyzed: output.accounts_analyzed,
            videos_summarized: output.videos_summarized,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        })
    }
}

struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl NewsService for PipelineNewsService {
    async fn generate(&self) -> Result<NewsRunReport, NewsError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(NewsError::AlreadyRunning);
        }
        let _guard = RunGuard(&self.running);

        let _ = self.event_bus.send(NotificationEvent::NewsPipelineStarted);

        match self.run_pipeline().await {
            Ok(report) => {
                metrics::counter!("news_articles_generated_total")
                    .increment(report.articles.len() as u64);
                info!(
                    event = "news_generated",
                    articles = report.articles.len(),
                    duration_ms = report.duration_ms,
                    "News generation finished"
                );
                let _ = self.event_bus.send(NotificationEvent::NewsPipelineFinished {
                    articles: report.articles.len(),
                });
                Ok(report)
            }
            Err(e) => {
                metrics::counter!("news_pipeline_failures_total").increment(1);
                error!(event = "news_failed", error = %e, "News generation failed");
                let _ = self.event_bus.send(NotificationEvent::NewsPipelineFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{SocialPost, VideoRef};

    struct EchoModel {
        fenced: bool,
    }

    #[async_trait::async_trait]
    impl LanguageModel for EchoModel {
        async fn complete(&self, _system: &str, prompt: &str) -> anyhow::Result<String> {
            if !self.fenced {
                return Ok("{\"storylines\": []}".to_string());
            }
            let body = if prompt.starts_with("Analyze the recent posts") {
                "{\"account\": \"a\", \"topics\": []}"
            } else if prompt.starts_with("Below are topic analyses") {
                "{\"shared_topics\": [], \"mentioned_accounts\": []}"
            } else if prompt.starts_with("Using the account analyses") {
                "{\"storylines\": [{\"title\": \"Card\", \"summary\": \"s\", \"sources\": [\"@a\"]}]}"
            } else {
                "{\"title\": \"Card set\", \"summary\": \"s\", \"content\": \"c\", \"tags\": [\"card\"]}"
            };
            Ok(format!("```json\n{body}\n```"))
        }
    }

    struct NoPosts;

    #[async_trait::async_trait]
    impl SocialSource for NoPosts {
        async fn recent_posts(&self, _account: &str, _limit: u32) -> anyhow::Result<Vec<SocialPost>> {
            Ok(Vec::new())
        }
    }

    struct NoVideos;

    #[async_trait::async_trait]
    impl VideoSource for NoVideos {
        async fn search(&self, _query: &str, _limit: u32) -> anyhow::Result<Vec<VideoRef>> {
            Ok(Vec::new())
        }

        async fn transcript(&self, _video_id: &str) -> anyhow::Result<Option<String>> {
            Ok(None)
        }
    }

    async fn service(enabled: bool, fenced: bool) -> (PipelineNewsService, Store) {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let mut config = Config::default();
        config.news.enabled = enabled;
        config.news.accounts = vec!["a".to_string()];
        let (tx, _rx) = broadcast::channel(16);

        let service = PipelineNewsService::new(
            store.clone(),
            Arc::new(RwLock::new(config)),
            Arc::new(EchoModel { fenced }),
            Arc::new(NoPosts),
            Arc::new(NoVideos),
            tx,
        );
        (service, store)
    }

    #[tokio::test]
    async fn test_generate_stores_unpublished_articles() {
        let (service, store) = service(true, true).await;

        let report = service.generate().await.unwrap();

        assert_eq!(report.articles.len(), 1);
        let stored = store.news_repo().list(false, None).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!(!stored[0].published);
        assert!(stored[0].generated);
        assert_eq!(stored[0].storyline.as_deref(), Some("Card"));
        assert!(!service.is_running());
    }

    #[tokio::test]
    async fn test_failed_run_persists_nothing() {
        let (service, store) = service(true, false).await;

        let err = service.generate().await.unwrap_err();

        assert!(matches!(err, NewsError::InvalidResponse { phase: 1 }));
        assert_eq!(store.news_repo().count().await.unwrap(), 0);
        assert!(!service.is_running());
    }

    #[tokio::test]
    async fn test_disabled_news_is_rejected() {
        let (service, _store) = service(false, true).await;
        assert!(matches!(service.generate().await, Err(NewsError::Disabled)));
    }
}
