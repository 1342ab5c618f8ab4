use sea_orm_migration::prelude::*;

mod m20250101_initial;
mod m20250102_seed_catalog;
mod m20250103_analytics_views;

pub use m20250102_seed_catalog::DEFAULT_API_KEY;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_initial::Migration),
            Box::new(m20250102_seed_catalog::Migration),
            Box::new(m20250103_analytics_views::Migration),
        ]
    }
}
