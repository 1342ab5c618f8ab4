//! Materialized: role-weighted score per battler and attribute.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "battler_attribute_scores")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub battler_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub attribute_id: i32,
    pub score: Option<f64>,
    pub rating_count: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
