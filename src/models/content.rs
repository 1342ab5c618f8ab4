use serde::{Deserialize, Serialize};

use crate::entities::{media_content, news_articles};

#[derive(Debug, Clone, Serialize)]
pub struct MediaItem {
    pub id: i32,
    pub battler_id: Option<i32>,
    pub title: String,
    pub url: String,
    pub kind: String,
    pub description: Option<String>,
    pub created_by: Option<i32>,
    pub created_at: String,
}

impl From<media_content::Model> for MediaItem {
    fn from(model: media_content::Model) -> Self {
        Self {
            id: model.id,
            battler_id: model.battler_id,
            title: model.title,
            url: model.url,
            kind: model.kind,
            description: model.description,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaInput {
    pub battler_id: Option<i32>,
    pub title: String,
    pub url: String,
    pub kind: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Article {
    pub id: i32,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub storyline: Option<String>,
    pub tags: Vec<String>,
    pub sources: Vec<String>,
    pub published: bool,
    pub generated: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<news_articles::Model> for Article {
    fn from(model: news_articles::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            summary: model.summary,
            content: model.content,
            storyline: model.storyline,
            tags: serde_json::from_str(&model.tags).unwrap_or_default(),
            sources: serde_json::from_str(&model.sources).unwrap_or_default(),
            published: model.published,
            generated: model.generated,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleInput {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub storyline: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub published: bool,
}
