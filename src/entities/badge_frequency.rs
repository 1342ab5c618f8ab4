//! Materialized: how often each badge has been assigned.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "badge_frequency")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub badge_id: i32,
    pub name: String,
    pub category: String,
    pub is_positive: bool,
    pub assignment_count: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
