use sea_orm::entity::prelude::*;

/// A rated trait. Unique per (category, name).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "attributes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub sort_order: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::battler_ratings::Entity")]
    BattlerRatings,
}

impl Related<super::battler_ratings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BattlerRatings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
