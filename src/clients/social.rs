use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::SocialConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SocialPost {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Source of recent posts per account handle.
#[async_trait]
pub trait SocialSource: Send + Sync {
    async fn recent_posts(&self, account: &str, limit: u32) -> Result<Vec<SocialPost>>;
}

#[derive(Deserialize)]
struct UserLookup {
    data: Option<UserData>,
}

#[derive(Deserialize)]
struct UserData {
    id: String,
}

#[derive(Deserialize)]
struct TimelineResponse {
    #[serde(default)]
    data: Vec<SocialPost>,
}

/// Client for the X (Twitter) v2 API.
pub struct TwitterClient {
    client: Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl TwitterClient {
    pub fn new(config: &SocialConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent("BarScore/1.0")
            .build()
            .context("Failed to build social HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bearer_token: std::env::var(&config.bearer_token_env).ok(),
        })
    }

    fn request(&self, url: Url) -> reqwest::RequestBuilder {
        let builder = self.client.get(url);
        match &self.bearer_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl SocialSource for TwitterClient {
    async fn recent_posts(&self, account: &str, limit: u32) -> Result<Vec<SocialPost>> {
        let handle = account.trim_start_matches('@');

        let lookup_url = Url::parse(&format!("{}/users/by/username/{handle}", self.base_url))?;
        let lookup: UserLookup = self
            .request(lookup_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let user = lookup
            .data
            .ok_or_else(|| anyhow!("Unknown social account @{handle}"))?;

        // The timeline endpoint accepts 5..=100 results per page
        let max_results = limit.clamp(5, 100);
        let mut url = Url::parse(&format!("{}/users/{}/tweets", self.base_url, user.id))?;
        url.query_pairs_mut()
            .append_pair("max_results", &max_results.to_string())
            .append_pair("tweet.fields", "created_at")
            .append_pair("exclude", "retweets");

        debug!(account = %handle, max_results, "Fetching recent posts");

        let timeline: TimelineResponse = self
            .request(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut posts = timeline.data;
        posts.truncate(limit as usize);
        Ok(posts)
    }
}
