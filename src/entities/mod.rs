pub mod prelude;

pub mod analytics_refreshes;
pub mod attributes;
pub mod badge_frequency;
pub mod badges;
pub mod battler_attribute_scores;
pub mod battler_badges;
pub mod battler_ratings;
pub mod battler_scores;
pub mod battler_tags;
pub mod battlers;
pub mod media_content;
pub mod news_articles;
pub mod rating_distribution;
pub mod role_activity;
pub mod role_weights;
pub mod tags;
pub mod users;
