use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "battlers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,

    #[sea_orm(unique)]
    pub slug: String,

    pub bio: Option<String>,

    pub location: Option<String>,

    pub league: Option<String>,

    /// File name under the images directory.
    pub image_path: Option<String>,

    pub active: bool,

    pub created_by: Option<i32>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::battler_ratings::Entity")]
    BattlerRatings,
    #[sea_orm(has_many = "super::battler_badges::Entity")]
    BattlerBadges,
    #[sea_orm(has_many = "super::battler_tags::Entity")]
    BattlerTags,
    #[sea_orm(has_many = "super::media_content::Entity")]
    MediaContent,
}

impl Related<super::battler_ratings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BattlerRatings.def()
    }
}

impl Related<super::battler_badges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BattlerBadges.def()
    }
}

impl Related<super::media_content::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MediaContent.def()
    }
}

impl Related<super::tags::Entity> for Entity {
    fn to() -> RelationDef {
        super::battler_tags::Relation::Tag.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::battler_tags::Relation::Battler.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
