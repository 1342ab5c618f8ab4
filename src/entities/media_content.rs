use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "media_content")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub battler_id: Option<i32>,
    pub title: String,
    pub url: String,
    /// One of `video`, `audio`, `article`, `image`.
    pub kind: String,
    pub description: Option<String>,
    pub created_by: Option<i32>,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::battlers::Entity",
        from = "Column::BattlerId",
        to = "super::battlers::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Battler,
}

impl Related<super::battlers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Battler.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
