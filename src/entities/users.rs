use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Random API key (64-char hex string)
    #[sea_orm(unique)]
    pub api_key: String,

    /// One of `fan`, `media`, `battler`, `league_owner`, `admin`.
    pub role: String,

    pub display_name: Option<String>,

    pub bio: Option<String>,

    pub avatar_url: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::battler_ratings::Entity")]
    BattlerRatings,
    #[sea_orm(has_many = "super::battler_badges::Entity")]
    BattlerBadges,
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

impl ActiveModelBehavior for ActiveModel {}
