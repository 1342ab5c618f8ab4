use sea_orm::entity::prelude::*;

/// One user's score for one attribute of one battler.
/// Unique per (`user_id`, `battler_id`, `attribute_id`).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "battler_ratings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub battler_id: i32,
    pub attribute_id: i32,
    pub score: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::battlers::Entity",
        from = "Column::BattlerId",
        to = "super::battlers::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Battler,
    #[sea_orm(
        belongs_to = "super::attributes::Entity",
        from = "Column::AttributeId",
        to = "super::attributes::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Attribute,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::battlers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Battler.def()
    }
}

impl Related<super::attributes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attribute.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
