//! Materialized: category and total scores per battler.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "battler_scores")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub battler_id: i32,
    pub writing: Option<f64>,
    pub performance: Option<f64>,
    pub personal: Option<f64>,
    pub total: Option<f64>,
    pub rating_count: i64,
    pub rater_count: i64,
    pub refreshed_at: String,
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
