use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::media_content;
use crate::models::content::{MediaInput, MediaItem};

pub struct MediaRepository {
    conn: DatabaseConnection,
}

impl MediaRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self, battler_id: Option<i32>, kind: Option<&str>) -> Result<Vec<MediaItem>> {
        let mut query = media_content::Entity::find();
        if let Some(id) = battler_id {
            query = query.filter(media_content::Column::BattlerId.eq(id));
        }
        if let Some(kind) = kind {
            query = query.filter(media_content::Column::Kind.eq(kind));
        }

        let rows = query
            .order_by_desc(media_content::Column::CreatedAt)
            .order_by_desc(media_content::Column::Id)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(MediaItem::from).collect())
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<MediaItem>> {
        let rows = media_content::Entity::find()
            .order_by_desc(media_content::Column::CreatedAt)
            .order_by_desc(media_content::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(MediaItem::from).collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<MediaItem>> {
        Ok(media_content::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .map(MediaItem::from))
    }

    pub async fn create(&self, input: &MediaInput, created_by: Option<i32>) -> Result<MediaItem> {
        let model = media_content::ActiveModel {
            battler_id: Set(input.battler_id),
            title: Set(input.title.trim().to_string()),
            url: Set(input.url.trim().to_string()),
            kind: Set(input.kind.clone()),
            description: Set(input.description.clone()),
            created_by: Set(created_by),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert media item")?;

        Ok(MediaItem::from(model))
    }

    pub async fn update(&self, id: i32, input: &MediaInput) -> Result<Option<MediaItem>> {
        let Some(existing) = media_content::Entity::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: media_content::ActiveModel = existing.into();
        active.battler_id = Set(input.battler_id);
        active.title = Set(input.title.trim().to_string());
        active.url = Set(input.url.trim().to_string());
        active.kind = Set(input.kind.clone());
        active.description = Set(input.description.clone());

        Ok(Some(MediaItem::from(active.update(&self.conn).await?)))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = media_content::Entity::delete_by_id(id)
            .exec(&self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
