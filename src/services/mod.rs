pub mod image;
pub use image::ImageService;

pub mod validation;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, LoginResult, UserInfo};
pub use auth_service_impl::SeaOrmAuthService;

pub mod profile_service;
pub mod profile_service_impl;
pub use profile_service::{ProfileError, ProfileRequest, ProfileService, PublicProfile};
pub use profile_service_impl::SeaOrmProfileService;

pub mod battler_service;
pub mod battler_service_impl;
pub use battler_service::{BattlerDetail, BattlerError, BattlerPage, BattlerService};
pub use battler_service_impl::SeaOrmBattlerService;

pub mod rating_service;
pub mod rating_service_impl;
pub use rating_service::{RatingError, RatingService, RatingSubmission};
pub use rating_service_impl::SeaOrmRatingService;

pub mod analytics_service;
pub mod analytics_service_impl;
pub use analytics_service::{AnalyticsError, AnalyticsService, LeaderboardQuery};
pub use analytics_service_impl::SeaOrmAnalyticsService;

pub mod content_service;
pub mod content_service_impl;
pub use content_service::{ContentError, ContentService};
pub use content_service_impl::SeaOrmContentService;

pub mod news;
pub use news::{NewsError, NewsService, PipelineNewsService};

pub mod system_service;
pub mod system_service_impl;
pub use system_service::{SystemError, SystemService, SystemStatus};
pub use system_service_impl::SeaOrmSystemService;

pub mod scheduler;
pub use scheduler::Scheduler;
