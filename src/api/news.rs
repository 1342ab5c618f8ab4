use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::validation::validate_id;
use super::{ActionResult, ApiError, ApiResponse, AppState};
use crate::models::content::{Article, ArticleInput};

#[derive(Debug, Default, Deserialize)]
pub struct PublishParams {
    pub published: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct GenerationStarted {
    pub started: bool,
    pub message: String,
}

/// GET /news
pub async fn list_published(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Article>>>, ApiError> {
    let articles = state.shared.content_service.list_articles(true).await?;
    Ok(Json(ApiResponse::success(articles)))
}

/// GET /news/{id}
pub async fn get_published(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Article>>, ApiError> {
    let id = validate_id("article", id)?;
    let article = state.shared.content_service.get_article(id, false).await?;
    Ok(Json(ApiResponse::success(article)))
}

/// GET /admin/news
/// Every article, drafts included.
pub async fn list_all(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Article>>>, ApiError> {
    let articles = state.shared.content_service.list_articles(false).await?;
    Ok(Json(ApiResponse::success(articles)))
}

/// POST /admin/news
pub async fn create_article(
    State(state): State<Arc<AppState>>,
    Json(input): Json<ArticleInput>,
) -> Result<Json<ApiResponse<Article>>, ApiError> {
    let article = state.shared.content_service.create_article(input).await?;
    Ok(Json(ApiResponse::success(article)))
}

/// PUT /admin/news/{id}
pub async fn update_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(input): Json<ArticleInput>,
) -> Result<Json<ApiResponse<Article>>, ApiError> {
    let id = validate_id("article", id)?;
    let article = state
        .shared
        .content_service
        .update_article(id, input)
        .await?;
    Ok(Json(ApiResponse::success(article)))
}

/// DELETE /admin/news/{id}
pub async fn delete_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ActionResult>>, ApiError> {
    let id = validate_id("article", id)?;
    state.shared.content_service.delete_article(id).await?;
    Ok(Json(ApiResponse::action(format!("Article {id} deleted"))))
}

/// POST /admin/news/{id}/publish
/// Publishes by default; `?published=false` moves the article back to drafts.
pub async fn publish_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Query(params): Query<PublishParams>,
) -> Result<Json<ApiResponse<Article>>, ApiError> {
    let id = validate_id("article", id)?;
    let published = params.published.unwrap_or(true);
    let article = state
        .shared
        .content_service
        .set_published(id, published)
        .await?;
    Ok(Json(ApiResponse::success(article)))
}

/// POST /admin/news/generate
/// Starts a pipeline run in the background; progress arrives on the event
/// stream.
pub async fn generate(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<GenerationStarted>>, ApiError> {
    {
        let config = state.config().read().await;
        if !config.news.enabled {
            return Err(ApiError::validation("News generation is disabled"));
        }
    }
    if state.shared.news_service.is_running() {
        return Err(ApiError::Conflict(
            "A news generation run is already in progress".to_string(),
        ));
    }

    let news = state.shared.news_service.clone();
    tokio::spawn(async move {
        // Outcome is logged and broadcast by the service
        if let Ok(report) = news.generate().await {
            info!(articles = report.articles.len(), "Background news generation done");
        }
    });

    Ok(Json(ApiResponse::success(GenerationStarted {
        started: true,
        message: "News generation started".to_string(),
    })))
}
