use serde::{Deserialize, Serialize};

use crate::entities::battlers;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battler {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub league: Option<String>,
    pub image_path: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

fn default_true() -> bool {
    true
}

impl From<battlers::Model> for Battler {
    fn from(model: battlers::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            bio: model.bio,
            location: model.location,
            league: model.league,
            image_path: model.image_path,
            active: model.active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Fields accepted when creating or editing a battler profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattlerInput {
    pub name: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub league: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub active: Option<bool>,
}

/// Listing filter for battlers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BattlerFilter {
    pub search: Option<String>,
    pub tag: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}
