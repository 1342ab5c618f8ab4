use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QuerySelect, RelationTrait, Set, TransactionTrait, sea_query::Expr,
};
use serde::Serialize;
use tracing::info;

use super::analytics::refresh_badge;
use crate::entities::{badges, battler_badges};

/// Result of toggling a badge assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleOutcome {
    pub selected: bool,
    /// Assignments of this badge to this battler across all users.
    pub battler_count: i64,
    /// Assignments of this badge across all battlers.
    pub total_count: i64,
}

#[derive(Debug, Clone, FromQueryResult, Serialize)]
pub struct BattlerBadgeCount {
    pub badge_id: i32,
    pub name: String,
    pub category: String,
    pub is_positive: bool,
    pub count: i64,
}

pub struct BadgeRepository {
    conn: DatabaseConnection,
}

impl BadgeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts the assignment when absent and deletes it when present.
    pub async fn toggle(&self, user_id: i32, battler_id: i32, badge_id: i32) -> Result<ToggleOutcome> {
        let txn = self.conn.begin().await?;

        let existing = battler_badges::Entity::find_by_id((user_id, battler_id, badge_id))
            .one(&txn)
            .await?;

        let selected = if existing.is_some() {
            battler_badges::Entity::delete_by_id((user_id, battler_id, badge_id))
                .exec(&txn)
                .await?;
            false
        } else {
            battler_badges::Entity::insert(battler_badges::ActiveModel {
                user_id: Set(user_id),
                battler_id: Set(battler_id),
                badge_id: Set(badge_id),
                created_at: Set(chrono::Utc::now().to_rfc3339()),
            })
            .exec_without_returning(&txn)
            .await?;
            true
        };

        let battler_count = battler_badges::Entity::find()
            .filter(battler_badges::Column::BattlerId.eq(battler_id))
            .filter(battler_badges::Column::BadgeId.eq(badge_id))
            .count(&txn)
            .await?;
        let total_count = refresh_badge(&txn, badge_id).await?;

        txn.commit().await?;

        info!(
            event = "badge_toggled",
            user_id, battler_id, badge_id, selected, "Toggled badge"
        );

        Ok(ToggleOutcome {
            selected,
            battler_count: i64::try_from(battler_count).unwrap_or(i64::MAX),
            total_count,
        })
    }

    /// Assignment counts per badge for one battler.
    pub async fn counts_for_battler(&self, battler_id: i32) -> Result<Vec<BattlerBadgeCount>> {
        let rows = battler_badges::Entity::find()
            .select_only()
            .column(battler_badges::Column::BadgeId)
            .column(badges::Column::Name)
            .column(badges::Column::Category)
            .column(badges::Column::IsPositive)
            .column_as(
                Expr::col((battler_badges::Entity, battler_badges::Column::UserId)).count(),
                "count",
            )
            .join(JoinType::InnerJoin, battler_badges::Relation::Badge.def())
            .filter(battler_badges::Column::BattlerId.eq(battler_id))
            .group_by(battler_badges::Column::BadgeId)
            .group_by(badges::Column::Name)
            .group_by(badges::Column::Category)
            .group_by(badges::Column::IsPositive)
            .into_model::<BattlerBadgeCount>()
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    /// Badge ids the user has assigned to a battler.
    pub async fn for_user(&self, user_id: i32, battler_id: i32) -> Result<Vec<i32>> {
        let ids: Vec<i32> = battler_badges::Entity::find()
            .select_only()
            .column(battler_badges::Column::BadgeId)
            .filter(battler_badges::Column::UserId.eq(user_id))
            .filter(battler_badges::Column::BattlerId.eq(battler_id))
            .into_tuple()
            .all(&self.conn)
            .await?;
        Ok(ids)
    }

    pub async fn count_by_user(&self, user_id: i32) -> Result<u64> {
        Ok(battler_badges::Entity::find()
            .filter(battler_badges::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await?)
    }
}
