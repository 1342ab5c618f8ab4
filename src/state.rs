use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use crate::clients::{
    LanguageModel, OpenAiClient, SocialSource, TwitterClient, VideoSource, YouTubeClient,
};
use crate::config::Config;
use crate::db::Store;
use crate::domain::events::NotificationEvent;
use crate::services::{
    AnalyticsService, AuthService, BattlerService, ContentService, ImageService, NewsService,
    PipelineNewsService, ProfileService, RatingService, SeaOrmAnalyticsService, SeaOrmAuthService,
    SeaOrmBattlerService, SeaOrmContentService, SeaOrmProfileService, SeaOrmRatingService,
    SeaOrmSystemService, SystemService,
};

/// External clients used by the news pipeline.
#[derive(Clone)]
pub struct NewsClients {
    pub llm: Arc<dyn LanguageModel>,
    pub social: Arc<dyn SocialSource>,
    pub video: Arc<dyn VideoSource>,
}

impl NewsClients {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            llm: Arc::new(OpenAiClient::new(&config.news.llm)?),
            social: Arc::new(TwitterClient::new(&config.news.social)?),
            video: Arc::new(YouTubeClient::new(&config.news.video)?),
        })
    }
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub event_bus: broadcast::Sender<NotificationEvent>,

    pub image_service: Arc<ImageService>,

    pub auth_service: Arc<dyn AuthService>,

    pub profile_service: Arc<dyn ProfileService>,

    pub battler_service: Arc<dyn BattlerService>,

    pub rating_service: Arc<dyn RatingService>,

    pub analytics_service: Arc<dyn AnalyticsService>,

    pub content_service: Arc<dyn ContentService>,

    pub news_service: Arc<dyn NewsService>,

    pub system_service: Arc<dyn SystemService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let clients = NewsClients::from_config(&config)?;
        Self::with_clients(config, clients).await
    }

    /// Builds the state with explicit news clients, which lets tests swap in
    /// scripted ones.
    pub async fn with_clients(config: Config, clients: NewsClients) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;
        store
            .role_weight_repo()
            .seed_missing(&config.ratings.seed_weights()?)
            .await?;
        Ok(Self::from_parts(config, store, clients))
    }

    #[must_use]
    pub fn from_parts(config: Config, store: Store, clients: NewsClients) -> Self {
        let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size.max(1));

        let image_service = Arc::new(ImageService::new(
            &config.general.images_path,
            config.general.max_image_bytes,
        ));
        let config = Arc::new(RwLock::new(config));

        let auth_service = Arc::new(SeaOrmAuthService::new(store.clone(), config.clone()));
        let profile_service = Arc::new(SeaOrmProfileService::new(store.clone()));
        let battler_service = Arc::new(SeaOrmBattlerService::new(
            store.clone(),
            image_service.clone(),
            event_bus.clone(),
        ));
        let rating_service = Arc::new(SeaOrmRatingService::new(store.clone(), config.clone()));
        let analytics_service = Arc::new(SeaOrmAnalyticsService::new(
            store.clone(),
            config.clone(),
            event_bus.clone(),
        ));
        let content_service = Arc::new(SeaOrmContentService::new(store.clone()));
        let news_service = Arc::new(PipelineNewsService::new(
            store.clone(),
            config.clone(),
            clients.llm,
            clients.social,
            clients.video,
            event_bus.clone(),
        ));
        let system_service = Arc::new(SeaOrmSystemService::new(store.clone(), config.clone()));

        Self {
            config,
            store,
            event_bus,
            image_service,
            auth_service,
            profile_service,
            battler_service,
            rating_service,
            analytics_service,
            content_service,
            news_service,
            system_service,
        }
    }
}
