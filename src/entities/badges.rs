use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "badges")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub category: String,
    pub is_positive: bool,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::battler_badges::Entity")]
    BattlerBadges,
}

impl Related<super::battler_badges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BattlerBadges.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
