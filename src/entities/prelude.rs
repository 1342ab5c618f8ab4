pub use super::analytics_refreshes::Entity as AnalyticsRefreshes;
pub use super::attributes::Entity as Attributes;
pub use super::badge_frequency::Entity as BadgeFrequency;
pub use super::badges::Entity as Badges;
pub use super::battler_attribute_scores::Entity as BattlerAttributeScores;
pub use super::battler_badges::Entity as BattlerBadges;
pub use super::battler_ratings::Entity as BattlerRatings;
pub use super::battler_scores::Entity as BattlerScores;
pub use super::battler_tags::Entity as BattlerTags;
pub use super::battlers::Entity as Battlers;
pub use super::media_content::Entity as MediaContent;
pub use super::news_articles::Entity as NewsArticles;
pub use super::rating_distribution::Entity as RatingDistribution;
pub use super::role_activity::Entity as RoleActivity;
pub use super::role_weights::Entity as RoleWeights;
pub use super::tags::Entity as Tags;
pub use super::users::Entity as Users;
