use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entities::news_articles;
use crate::models::content::{Article, ArticleInput};

fn to_json(values: &[String]) -> Result<String> {
    serde_json::to_string(values).context("Failed to encode string list")
}

fn active_model(input: &ArticleInput, generated: bool, now: &str) -> Result<news_articles::ActiveModel> {
    Ok(news_articles::ActiveModel {
        title: Set(input.title.trim().to_string()),
        summary: Set(input.summary.trim().to_string()),
        content: Set(input.content.clone()),
        storyline: Set(input.storyline.clone()),
        tags: Set(to_json(&input.tags)?),
        sources: Set(to_json(&input.sources)?),
        published: Set(input.published),
        generated: Set(generated),
        created_at: Set(now.to_string()),
        updated_at: Set(now.to_string()),
        ..Default::default()
    })
}

pub struct NewsRepository {
    conn: DatabaseConnection,
}

impl NewsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self, published_only: bool, limit: Option<u64>) -> Result<Vec<Article>> {
        let mut query = news_articles::Entity::find();
        if published_only {
            query = query.filter(news_articles::Column::Published.eq(true));
        }

        let rows = query
            .order_by_desc(news_articles::Column::CreatedAt)
            .order_by_desc(news_articles::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(Article::from).collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<Article>> {
        Ok(news_articles::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .map(Article::from))
    }

    pub async fn create(&self, input: &ArticleInput) -> Result<Article> {
        let now = chrono::Utc::now().to_rfc3339();
        let model = active_model(input, false, &now)?.insert(&self.conn).await?;
        Ok(Article::from(model))
    }

    /// Stores pipeline output. Either every article is saved or none is.
    pub async fn insert_generated(&self, inputs: &[ArticleInput]) -> Result<Vec<Article>> {
        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.conn.begin().await?;

        let mut saved = Vec::with_capacity(inputs.len());
        for input in inputs {
            let model = active_model(input, true, &now)?.insert(&txn).await?;
            saved.push(Article::from(model));
        }

        txn.commit().await?;
        Ok(saved)
    }

    pub async fn update(&self, id: i32, input: &ArticleInput) -> Result<Option<Article>> {
        let Some(existing) = news_articles::Entity::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: news_articles::ActiveModel = existing.into();
        active.title = Set(input.title.trim().to_string());
        active.summary = Set(input.summary.trim().to_string());
        active.content = Set(input.content.clone());
        active.storyline = Set(input.storyline.clone());
        active.tags = Set(to_json(&input.tags)?);
        active.sources = Set(to_json(&input.sources)?);
        active.published = Set(input.published);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        Ok(Some(Article::from(active.update(&self.conn).await?)))
    }

    pub async fn set_published(&self, id: i32, published: bool) -> Result<Option<Article>> {
        let Some(existing) = news_articles::Entity::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: news_articles::ActiveModel = existing.into();
        active.published = Set(published);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        Ok(Some(Article::from(active.update(&self.conn).await?)))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = news_articles::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(news_articles::Entity::find().count(&self.conn).await?)
    }
}
