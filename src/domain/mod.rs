//! Domain types for the rating platform.
//!
//! Roles and attribute categories are closed sets; they are stored as their
//! snake-case string form and parsed back with [`FromStr`].

pub mod events;
pub mod scoring;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use scoring::{AttributeRef, RoleAverage, RoleWeights, ScoreCard};

/// Platform role of a user. Each role carries a rating weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Fan,
    Media,
    Battler,
    LeagueOwner,
    Admin,
}

impl Role {
    pub const ALL: [Self; 5] = [
        Self::Fan,
        Self::Media,
        Self::Battler,
        Self::LeagueOwner,
        Self::Admin,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fan => "fan",
            Self::Media => "media",
            Self::Battler => "battler",
            Self::LeagueOwner => "league_owner",
            Self::Admin => "admin",
        }
    }

    /// Documented default weight for the role.
    #[must_use]
    pub const fn default_weight(&self) -> f64 {
        match self {
            Self::Fan => 1.0,
            Self::Media => 2.0,
            Self::Battler => 2.5,
            Self::LeagueOwner => 3.0,
            Self::Admin => 5.0,
        }
    }

    /// Roles allowed to create, edit and delete battler profiles.
    #[must_use]
    pub const fn can_manage_battlers(&self) -> bool {
        matches!(self, Self::Admin | Self::LeagueOwner)
    }

    /// Roles allowed to publish media content.
    #[must_use]
    pub const fn can_manage_media(&self) -> bool {
        matches!(self, Self::Admin | Self::LeagueOwner | Self::Media)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fan" => Ok(Self::Fan),
            "media" => Ok(Self::Media),
            "battler" => Ok(Self::Battler),
            "league_owner" => Ok(Self::LeagueOwner),
            "admin" => Ok(Self::Admin),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

/// Grouping of rated attributes and badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Writing,
    Performance,
    Personal,
}

impl Category {
    pub const ALL: [Self; 3] = [Self::Writing, Self::Performance, Self::Personal];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Writing => "writing",
            Self::Performance => "performance",
            Self::Personal => "personal",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "writing" => Ok(Self::Writing),
            "performance" => Ok(Self::Performance),
            "personal" => Ok(Self::Personal),
            other => Err(format!("Unknown category: {other}")),
        }
    }
}

/// Kind of a media content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Audio,
    Article,
    Image,
}

impl MediaKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Article => "article",
            Self::Image => "image",
        }
    }
}

impl FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            "article" => Ok(Self::Article),
            "image" => Ok(Self::Image),
            other => Err(format!("Unknown media kind: {other}")),
        }
    }
}

/// The authenticated user performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

/// URL-safe slug: lowercase ASCII alphanumerics joined by single hyphens.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_names() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("moderator".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_permissions() {
        assert!(Role::Admin.can_manage_battlers());
        assert!(Role::LeagueOwner.can_manage_battlers());
        assert!(!Role::Fan.can_manage_battlers());
        assert!(Role::Media.can_manage_media());
        assert!(!Role::Battler.can_manage_media());
    }

    #[test]
    fn test_role_serde_uses_snake_case() {
        let json = serde_json::to_string(&Role::LeagueOwner).unwrap();
        assert_eq!(json, "\"league_owner\"");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Loaded Lux"), "loaded-lux");
        assert_eq!(slugify("  Rum Nitty!! "), "rum-nitty");
        assert_eq!(slugify("K-Shine & Dizaster"), "k-shine-dizaster");
        assert_eq!(slugify("***"), "");
    }
}
