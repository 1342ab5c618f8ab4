use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait, sea_query::OnConflict,
};
use std::collections::BTreeMap;
use tracing::info;

use super::analytics::refresh_battler;
use crate::domain::ScoreCard;
use crate::entities::battler_ratings;

/// One attribute score submitted by a user.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingEntry {
    pub attribute_id: i32,
    pub score: f64,
}

pub struct RatingRepository {
    conn: DatabaseConnection,
}

impl RatingRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Upserts the user's ratings and refreshes the battler's aggregate rows
    /// in the same transaction.
    pub async fn upsert_many(
        &self,
        user_id: i32,
        battler_id: i32,
        entries: &[RatingEntry],
    ) -> Result<ScoreCard> {
        let now = chrono::Utc::now().to_rfc3339();
        let txn = self.conn.begin().await?;

        for entry in entries {
            battler_ratings::Entity::insert(battler_ratings::ActiveModel {
                user_id: Set(user_id),
                battler_id: Set(battler_id),
                attribute_id: Set(entry.attribute_id),
                score: Set(entry.score),
                created_at: Set(now.clone()),
                updated_at: Set(now.clone()),
                ..Default::default()
            })
            .on_conflict(
                OnConflict::columns([
                    battler_ratings::Column::UserId,
                    battler_ratings::Column::BattlerId,
                    battler_ratings::Column::AttributeId,
                ])
                .update_columns([battler_ratings::Column::Score, battler_ratings::Column::UpdatedAt])
                .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
        }

        let card = refresh_battler(&txn, battler_id).await?;
        txn.commit().await?;

        info!(
            event = "ratings_submitted",
            user_id,
            battler_id,
            count = entries.len(),
            "Stored ratings"
        );
        Ok(card)
    }

    /// Removes all of a user's ratings for a battler.
    pub async fn delete_for_user(&self, user_id: i32, battler_id: i32) -> Result<u64> {
        let txn = self.conn.begin().await?;

        let result = battler_ratings::Entity::delete_many()
            .filter(battler_ratings::Column::UserId.eq(user_id))
            .filter(battler_ratings::Column::BattlerId.eq(battler_id))
            .exec(&txn)
            .await?;

        refresh_battler(&txn, battler_id).await?;
        txn.commit().await?;

        Ok(result.rows_affected)
    }

    /// The user's current score per attribute for a battler.
    pub async fn for_user(&self, user_id: i32, battler_id: i32) -> Result<BTreeMap<i32, f64>> {
        let rows = battler_ratings::Entity::find()
            .filter(battler_ratings::Column::UserId.eq(user_id))
            .filter(battler_ratings::Column::BattlerId.eq(battler_id))
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(|r| (r.attribute_id, r.score)).collect())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(battler_ratings::Entity::find().count(&self.conn).await?)
    }

    pub async fn count_by_user(&self, user_id: i32) -> Result<u64> {
        Ok(battler_ratings::Entity::find()
            .filter(battler_ratings::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await?)
    }
}
