use crate::entities::prelude::*;
use crate::entities::{attributes, badges, battler_ratings};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{EntityTrait, Schema};

#[derive(DeriveMigrationName)]
pub struct Migration;

async fn create<E: EntityTrait>(
    manager: &SchemaManager<'_>,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    manager
        .create_table(
            schema
                .create_table_from_entity(entity)
                .if_not_exists()
                .to_owned(),
        )
        .await
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        // Parents before children so foreign keys resolve.
        create(manager, &schema, Users).await?;
        create(manager, &schema, Battlers).await?;
        create(manager, &schema, Tags).await?;
        create(manager, &schema, BattlerTags).await?;
        create(manager, &schema, Attributes).await?;
        create(manager, &schema, Badges).await?;
        create(manager, &schema, BattlerRatings).await?;
        create(manager, &schema, BattlerBadges).await?;
        create(manager, &schema, RoleWeights).await?;
        create(manager, &schema, MediaContent).await?;
        create(manager, &schema, NewsArticles).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_battler_ratings_unique")
                    .table(BattlerRatings)
                    .col(battler_ratings::Column::UserId)
                    .col(battler_ratings::Column::BattlerId)
                    .col(battler_ratings::Column::AttributeId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_battler_ratings_battler")
                    .table(BattlerRatings)
                    .col(battler_ratings::Column::BattlerId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attributes_category_name")
                    .table(Attributes)
                    .col(attributes::Column::Category)
                    .col(attributes::Column::Name)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_badges_category_name")
                    .table(Badges)
                    .col(badges::Column::Category)
                    .col(badges::Column::Name)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NewsArticles).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MediaContent).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RoleWeights).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BattlerBadges).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BattlerRatings).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Badges).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Attributes).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BattlerTags).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Battlers).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
