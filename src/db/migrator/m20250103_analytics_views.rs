use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(BattlerAttributeScores)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(BattlerScores)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(BadgeFrequency)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(RatingDistribution)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(RoleActivity)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(AnalyticsRefreshes)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AnalyticsRefreshes).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RoleActivity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RatingDistribution).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BadgeFrequency).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BattlerScores).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BattlerAttributeScores).to_owned())
            .await?;

        Ok(())
    }
}
