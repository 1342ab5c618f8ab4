pub mod llm;
pub mod social;
pub mod video;

pub use llm::{LanguageModel, OpenAiClient};
pub use social::{SocialPost, SocialSource, TwitterClient};
pub use video::{VideoRef, VideoSource, YouTubeClient};
