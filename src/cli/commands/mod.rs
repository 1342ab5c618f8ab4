mod analytics;
mod news;
mod role_weights;

pub use analytics::{cmd_leaderboard, cmd_refresh_analytics};
pub use news::cmd_news_generate;
pub use role_weights::{cmd_role_weights_reset, cmd_role_weights_show};
