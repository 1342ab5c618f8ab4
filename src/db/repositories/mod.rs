pub mod analytics;
pub mod badge;
pub mod battler;
pub mod catalog;
pub mod media;
pub mod news;
pub mod rating;
pub mod role_weight;
pub mod tag;
pub mod user;
