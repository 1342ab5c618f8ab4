use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
    sea_query::JoinType,
};
use tracing::info;

use crate::domain::slugify;
use crate::entities::{
    battler_attribute_scores, battler_badges, battler_ratings, battler_scores, battler_tags,
    battlers, media_content, tags,
};
use crate::models::battler::{Battler, BattlerFilter, BattlerInput};

pub const DEFAULT_PAGE_SIZE: u64 = 24;
pub const MAX_PAGE_SIZE: u64 = 100;
/// Highest page number accepted; keeps the row offset well inside `u64`.
pub const MAX_PAGE: u64 = 1_000_000;

/// Repository for battler profiles
pub struct BattlerRepository {
    conn: DatabaseConnection,
}

impl BattlerRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Returns one page of battlers and the total number of matches.
    pub async fn list(&self, filter: &BattlerFilter) -> Result<(Vec<Battler>, u64)> {
        let per_page = filter
            .per_page
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let page = filter.page.unwrap_or(1).clamp(1, MAX_PAGE);

        let mut query = battlers::Entity::find();

        if let Some(search) = filter.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            query = query.filter(
                Condition::any()
                    .add(battlers::Column::Name.contains(search))
                    .add(battlers::Column::League.contains(search))
                    .add(battlers::Column::Location.contains(search)),
            );
        }

        if let Some(tag) = filter.tag.as_deref().map(str::trim)
            && !tag.is_empty()
        {
            query = query
                .join(JoinType::InnerJoin, battlers::Relation::BattlerTags.def())
                .join(JoinType::InnerJoin, battler_tags::Relation::Tag.def())
                .filter(tags::Column::Name.eq(tag));
        }

        let paginator = query
            .order_by_asc(battlers::Column::Name)
            .paginate(&self.conn, per_page);

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page - 1).await?;

        Ok((rows.into_iter().map(Battler::from).collect(), total))
    }

    pub async fn get(&self, id: i32) -> Result<Option<Battler>> {
        let row = battlers::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query battler")?;
        Ok(row.map(Battler::from))
    }

    pub async fn get_by_ids(&self, ids: &[i32]) -> Result<Vec<Battler>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = battlers::Entity::find()
            .filter(battlers::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(Battler::from).collect())
    }

    pub async fn name_taken(&self, name: &str, except_id: Option<i32>) -> Result<bool> {
        let mut query = battlers::Entity::find().filter(
            Condition::any()
                .add(battlers::Column::Name.eq(name))
                .add(battlers::Column::Slug.eq(slugify(name))),
        );
        if let Some(id) = except_id {
            query = query.filter(battlers::Column::Id.ne(id));
        }
        Ok(query.count(&self.conn).await? > 0)
    }

    pub async fn create(&self, input: &BattlerInput, created_by: Option<i32>) -> Result<Battler> {
        let now = chrono::Utc::now().to_rfc3339();
        let name = input.name.trim().to_string();

        let active = battlers::ActiveModel {
            slug: Set(slugify(&name)),
            name: Set(name),
            bio: Set(input.bio.clone()),
            location: Set(input.location.clone()),
            league: Set(input.league.clone()),
            image_path: Set(None),
            active: Set(input.active.unwrap_or(true)),
            created_by: Set(created_by),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert battler")?;

        info!(battler_id = model.id, name = %model.name, "Created battler");
        Ok(Battler::from(model))
    }

    pub async fn update(&self, id: i32, input: &BattlerInput) -> Result<Option<Battler>> {
        let Some(existing) = battlers::Entity::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let name = input.name.trim().to_string();
        let mut active: battlers::ActiveModel = existing.into();
        active.slug = Set(slugify(&name));
        active.name = Set(name);
        active.bio = Set(input.bio.clone());
        active.location = Set(input.location.clone());
        active.league = Set(input.league.clone());
        if let Some(flag) = input.active {
            active.active = Set(flag);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active.update(&self.conn).await?;
        Ok(Some(Battler::from(model)))
    }

    pub async fn set_image(&self, id: i32, image_path: &str) -> Result<()> {
        battlers::Entity::update_many()
            .col_expr(
                battlers::Column::ImagePath,
                sea_orm::sea_query::Expr::value(image_path),
            )
            .col_expr(
                battlers::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(battlers::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    /// Deletes a battler together with everything that references it,
    /// including its rows in the materialized score tables. Frequency rows of
    /// the badges it carried are recomputed in the same transaction.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        let badge_ids: Vec<i32> = battler_badges::Entity::find()
            .select_only()
            .column(battler_badges::Column::BadgeId)
            .distinct()
            .filter(battler_badges::Column::BattlerId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;

        battler_ratings::Entity::delete_many()
            .filter(battler_ratings::Column::BattlerId.eq(id))
            .exec(&txn)
            .await?;
        battler_badges::Entity::delete_many()
            .filter(battler_badges::Column::BattlerId.eq(id))
            .exec(&txn)
            .await?;
        battler_tags::Entity::delete_many()
            .filter(battler_tags::Column::BattlerId.eq(id))
            .exec(&txn)
            .await?;
        media_content::Entity::delete_many()
            .filter(media_content::Column::BattlerId.eq(id))
            .exec(&txn)
            .await?;
        battler_attribute_scores::Entity::delete_many()
            .filter(battler_attribute_scores::Column::BattlerId.eq(id))
            .exec(&txn)
            .await?;
        battler_scores::Entity::delete_by_id(id).exec(&txn).await?;

        let result = battlers::Entity::delete_by_id(id).exec(&txn).await?;

        for badge_id in badge_ids {
            super::analytics::refresh_badge(&txn, badge_id).await?;
        }

        txn.commit().await?;

        let removed = result.rows_affected > 0;
        if removed {
            info!(battler_id = id, "Deleted battler");
        }
        Ok(removed)
    }

    pub async fn newest(&self, limit: u64) -> Result<Vec<Battler>> {
        let rows = battlers::Entity::find()
            .order_by_desc(battlers::Column::CreatedAt)
            .order_by_desc(battlers::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(Battler::from).collect())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(battlers::Entity::find().count(&self.conn).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use crate::db::Store;
    use crate::domain::Role;

    fn input(name: &str) -> BattlerInput {
        BattlerInput {
            name: name.to_string(),
            ..BattlerInput::default()
        }
    }

    #[tokio::test]
    async fn test_list_clamps_out_of_range_page() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let repo = store.battler_repo();
        repo.create(&input("Loaded Lux"), None).await.unwrap();

        let filter = BattlerFilter {
            page: Some(u64::MAX),
            per_page: Some(MAX_PAGE_SIZE),
            ..BattlerFilter::default()
        };
        let (rows, total) = repo.list(&filter).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(total, 1);

        let (rows, _) = repo.list(&BattlerFilter::default()).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_refreshes_badge_frequency() {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let security = SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            ..SecurityConfig::default()
        };
        let fan = store
            .user_repo()
            .create("fan", "password123", Role::Fan, &security)
            .await
            .unwrap();
        let battler = store.battler_repo().create(&input("Hitman Holla"), None).await.unwrap();
        let badge_id = store.catalog_repo().badges().await.unwrap()[0].id;

        store.badge_repo().toggle(fan.id, battler.id, badge_id).await.unwrap();
        assert_eq!(store.analytics_repo().badge_count(badge_id).await.unwrap(), 1);

        assert!(store.battler_repo().delete(battler.id).await.unwrap());
        assert_eq!(store.analytics_repo().badge_count(badge_id).await.unwrap(), 0);
        assert!(!store.battler_repo().delete(battler.id).await.unwrap());
    }
}
