use anyhow::Result;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait, sea_query::Expr,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::entities::{battler_tags, tags};

#[derive(Debug, Clone, FromQueryResult, Serialize)]
pub struct TagCount {
    pub id: i32,
    pub name: String,
    pub battler_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct BattlerTagRow {
    battler_id: i32,
    name: String,
}

pub struct TagRepository {
    conn: DatabaseConnection,
}

impl TagRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_with_counts(&self) -> Result<Vec<TagCount>> {
        let rows = tags::Entity::find()
            .select_only()
            .column(tags::Column::Id)
            .column(tags::Column::Name)
            .column_as(
                Expr::col((battler_tags::Entity, battler_tags::Column::BattlerId)).count(),
                "battler_count",
            )
            .join(JoinType::LeftJoin, tags::Relation::BattlerTags.def())
            .group_by(tags::Column::Id)
            .group_by(tags::Column::Name)
            .order_by_asc(tags::Column::Name)
            .into_model::<TagCount>()
            .all(&self.conn)
            .await?;

        Ok(rows)
    }

    pub async fn for_battler(&self, battler_id: i32) -> Result<Vec<String>> {
        let mut map = self.for_battlers(&[battler_id]).await?;
        Ok(map.remove(&battler_id).unwrap_or_default())
    }

    pub async fn for_battlers(&self, battler_ids: &[i32]) -> Result<HashMap<i32, Vec<String>>> {
        if battler_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = battler_tags::Entity::find()
            .select_only()
            .column(battler_tags::Column::BattlerId)
            .column(tags::Column::Name)
            .join(JoinType::InnerJoin, battler_tags::Relation::Tag.def())
            .filter(battler_tags::Column::BattlerId.is_in(battler_ids.iter().copied()))
            .order_by_asc(tags::Column::Name)
            .into_model::<BattlerTagRow>()
            .all(&self.conn)
            .await?;

        let mut map: HashMap<i32, Vec<String>> = HashMap::new();
        for row in rows {
            map.entry(row.battler_id).or_default().push(row.name);
        }
        Ok(map)
    }

    /// Replaces a battler's tag set, creating unknown tags on the way.
    pub async fn replace_for_battler(&self, battler_id: i32, names: &[String]) -> Result<Vec<String>> {
        let mut normalized: Vec<String> = names
            .iter()
            .map(|n| n.trim().to_lowercase())
            .filter(|n| !n.is_empty())
            .collect();
        normalized.sort();
        normalized.dedup();

        let txn = self.conn.begin().await?;

        battler_tags::Entity::delete_many()
            .filter(battler_tags::Column::BattlerId.eq(battler_id))
            .exec(&txn)
            .await?;

        for name in &normalized {
            let tag_id = match tags::Entity::find()
                .filter(tags::Column::Name.eq(name.as_str()))
                .one(&txn)
                .await?
            {
                Some(tag) => tag.id,
                None => {
                    let inserted = tags::Entity::insert(tags::ActiveModel {
                        name: Set(name.clone()),
                        ..Default::default()
                    })
                    .exec(&txn)
                    .await?;
                    inserted.last_insert_id
                }
            };

            battler_tags::Entity::insert(battler_tags::ActiveModel {
                battler_id: Set(battler_id),
                tag_id: Set(tag_id),
            })
            .exec_without_returning(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(normalized)
    }
}
