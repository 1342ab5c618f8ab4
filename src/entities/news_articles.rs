use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "news_articles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub summary: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub storyline: Option<String>,
    /// JSON array of tag strings.
    pub tags: String,
    /// JSON array of source references (accounts, video ids).
    pub sources: String,
    pub published: bool,
    /// Whether the article came out of the news pipeline.
    pub generated: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
