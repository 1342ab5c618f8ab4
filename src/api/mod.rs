use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::domain::events::NotificationEvent;
use crate::state::SharedState;

mod admin;
mod analytics;
pub mod auth;
mod battlers;
mod error;
pub mod events;
mod media;
mod news;
mod observability;
mod ratings;
mod system;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn event_bus(&self) -> &tokio::sync::broadcast::Sender<NotificationEvent> {
        &self.shared.event_bus
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (images_path, cors_origins, secure_cookies, inactivity_minutes, image_limit) = {
        let config = state.config().read().await;
        (
            config.general.images_path.clone(),
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_inactivity_minutes,
            config.general.max_image_bytes,
        )
    };

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            inactivity_minutes.max(1),
        )));

    let api_router = Router::new()
        .merge(create_public_router(image_limit))
        .merge(create_protected_router())
        .nest("/admin", create_admin_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth::identify))
        .layer(session_layer)
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .nest_service("/images", tower_http::services::ServeDir::new(images_path))
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

/// Routes open to anonymous callers. Handlers that mutate state take a
/// `CurrentUser`, which rejects unauthenticated requests with 401.
fn create_public_router(image_limit: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(system::health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/password", put(auth::change_password))
        .route("/auth/api-key", get(auth::get_api_key))
        .route("/auth/api-key/regenerate", post(auth::regenerate_api_key))
        .route("/profile", put(users::update_profile))
        .route("/users/{username}", get(users::public_profile))
        .route(
            "/battlers",
            get(battlers::list_battlers).post(battlers::create_battler),
        )
        .route(
            "/battlers/{id}",
            get(battlers::get_battler)
                .put(battlers::update_battler)
                .delete(battlers::delete_battler),
        )
        .route("/battlers/{id}/tags", put(battlers::set_tags))
        .route(
            "/battlers/{id}/image",
            put(battlers::upload_image).layer(DefaultBodyLimit::max(image_limit)),
        )
        .route(
            "/battlers/{id}/ratings",
            put(ratings::submit_ratings).delete(ratings::clear_ratings),
        )
        .route(
            "/battlers/{id}/ratings/breakdown",
            get(ratings::rating_breakdown),
        )
        .route(
            "/battlers/{id}/badges/{badge_id}/toggle",
            post(ratings::toggle_badge),
        )
        .route("/tags", get(battlers::list_tags))
        .route("/attributes", get(ratings::list_attributes))
        .route("/badges", get(ratings::list_badges))
        .route("/leaderboard", get(analytics::leaderboard))
        .route("/home", get(analytics::home))
        .route("/analytics/top-battlers", get(analytics::top_battlers))
        .route("/analytics/badges", get(analytics::badge_frequency))
        .route(
            "/analytics/rating-distribution",
            get(analytics::rating_distribution),
        )
        .route("/analytics/role-activity", get(analytics::role_activity))
        .route("/analytics/status", get(analytics::refresh_status))
        .route("/news", get(news::list_published))
        .route("/news/{id}", get(news::get_published))
        .route("/media", get(media::list_media).post(media::create_media))
        .route(
            "/media/{id}",
            put(media::update_media).delete(media::delete_media),
        )
}

fn create_protected_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/system/status", get(system::get_status))
        .route("/metrics", get(observability::get_metrics))
        .merge(events::router())
        .route_layer(middleware::from_fn(auth::require_user))
}

fn create_admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/role-weights",
            get(admin::get_role_weights).put(admin::update_role_weights),
        )
        .route("/role-weights/reset", post(admin::reset_role_weights))
        .route("/users", get(admin::list_users))
        .route("/users/{id}/role", put(admin::set_user_role))
        .route("/analytics/refresh", post(admin::refresh_analytics))
        .route("/news", get(news::list_all).post(news::create_article))
        .route(
            "/news/{id}",
            put(news::update_article).delete(news::delete_article),
        )
        .route("/news/{id}/publish", post(news::publish_article))
        .route("/news/generate", post(news::generate))
        .route_layer(middleware::from_fn(auth::require_admin))
}
