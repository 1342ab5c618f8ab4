use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::battler_tags::Entity")]
    BattlerTags,
}

impl Related<super::battlers::Entity> for Entity {
    fn to() -> RelationDef {
        super::battler_tags::Relation::Battler.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::battler_tags::Relation::Tag.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
