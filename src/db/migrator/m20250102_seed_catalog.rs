use crate::domain::Role;
use crate::entities::prelude::*;
use crate::entities::{attributes, badges, users};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Default API key (will be regenerated on first use if desired)
pub const DEFAULT_API_KEY: &str = "barscore_default_api_key_please_regenerate";

/// (category, name, description)
const ATTRIBUTES: &[(&str, &str, &str)] = &[
    ("writing", "Wordplay", "Double meanings, puns and clever language"),
    ("writing", "Punchlines", "Strength of the bars that land"),
    ("writing", "Schemes", "Extended concepts carried across bars"),
    ("writing", "Angles", "Personal, researched material aimed at the opponent"),
    ("writing", "Rhyme Complexity", "Multis, internals and density"),
    ("performance", "Delivery", "Cadence, enunciation and emphasis"),
    ("performance", "Stage Presence", "Command of the space and the opponent"),
    ("performance", "Crowd Control", "Reading and moving the room"),
    ("performance", "Recall", "Clean rounds without stumbles or chokes"),
    ("performance", "Rebuttals", "Off-the-top responses to the opponent"),
    ("personal", "Authenticity", "Believability of persona and material"),
    ("personal", "Consistency", "Quality across battles and rounds"),
    ("personal", "Professionalism", "Preparation, punctuality and conduct"),
];

/// (category, name, `is_positive`, description)
const BADGES: &[(&str, &str, bool, &str)] = &[
    ("writing", "Pen Game", true, "Consistently strong writing"),
    ("writing", "Scheme Master", true, "Known for long, tight schemes"),
    ("writing", "Angle Specialist", true, "Finds angles nobody else does"),
    ("writing", "Recycled Material", false, "Reuses bars or angles"),
    ("writing", "Corny", false, "Leans on cheap or dated lines"),
    ("performance", "Crowd Mover", true, "Gets reactions every round"),
    ("performance", "Clean Recall", true, "Rarely stumbles"),
    ("performance", "Choke Prone", false, "Known for forgetting rounds"),
    ("performance", "Monotone", false, "Flat delivery"),
    ("personal", "Fan Favorite", true, "Draws a crowd on any card"),
    ("personal", "Battle Ready", true, "Always prepared, always shows up"),
    ("personal", "Inconsistent", false, "Performance varies widely"),
    ("personal", "No Show Risk", false, "History of pulling out of events"),
];

fn hash_default_password() -> Result<String, DbErr> {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(b"password", &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DbErr::Custom(format!("Failed to hash default password: {e}")))
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = chrono::Utc::now().to_rfc3339();

        let admin = Query::insert()
            .into_table(Users)
            .columns([
                users::Column::Username,
                users::Column::PasswordHash,
                users::Column::ApiKey,
                users::Column::Role,
                users::Column::CreatedAt,
                users::Column::UpdatedAt,
            ])
            .values_panic([
                "admin".into(),
                hash_default_password()?.into(),
                DEFAULT_API_KEY.into(),
                Role::Admin.as_str().into(),
                now.clone().into(),
                now.into(),
            ])
            .to_owned();
        manager.exec_stmt(admin).await?;

        let mut attrs = Query::insert()
            .into_table(Attributes)
            .columns([
                attributes::Column::Category,
                attributes::Column::Name,
                attributes::Column::Description,
                attributes::Column::SortOrder,
            ])
            .to_owned();
        for (order, (category, name, description)) in (0_i32..).zip(ATTRIBUTES.iter()) {
            attrs.values_panic([
                (*category).into(),
                (*name).into(),
                (*description).into(),
                order.into(),
            ]);
        }
        manager.exec_stmt(attrs).await?;

        let mut badge_rows = Query::insert()
            .into_table(Badges)
            .columns([
                badges::Column::Category,
                badges::Column::Name,
                badges::Column::IsPositive,
                badges::Column::Description,
            ])
            .to_owned();
        for (category, name, is_positive, description) in BADGES {
            badge_rows.values_panic([
                (*category).into(),
                (*name).into(),
                (*is_positive).into(),
                (*description).into(),
            ]);
        }
        manager.exec_stmt(badge_rows).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(Query::delete().from_table(Badges).to_owned())
            .await?;
        manager
            .exec_stmt(Query::delete().from_table(Attributes).to_owned())
            .await?;
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Users)
                    .and_where(Expr::col(users::Column::Username).eq("admin"))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
