use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::VideoConfig;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoRef {
    pub id: String,
    pub title: String,
    pub channel: String,
}

/// Keyword video search with transcript lookup.
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<VideoRef>>;

    /// Returns `None` when the video has no transcript.
    async fn transcript(&self, video_id: &str) -> Result<Option<String>>;
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: SearchId,
    snippet: Snippet,
}

#[derive(Deserialize)]
struct SearchId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Deserialize)]
struct Snippet {
    title: String,
    #[serde(rename = "channelTitle", default)]
    channel_title: String,
}

#[derive(Deserialize)]
struct TranscriptResponse {
    transcript: Option<String>,
}

/// Client for the `YouTube` Data API plus a transcript endpoint.
pub struct YouTubeClient {
    client: Client,
    base_url: String,
    transcript_url: String,
    api_key: Option<String>,
}

impl YouTubeClient {
    pub fn new(config: &VideoConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent("BarScore/1.0")
            .build()
            .context("Failed to build video HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            transcript_url: config.transcript_url.clone(),
            api_key: std::env::var(&config.api_key_env).ok(),
        })
    }
}

#[async_trait]
impl VideoSource for YouTubeClient {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<VideoRef>> {
        let mut url = Url::parse(&format!("{}/search", self.base_url))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("part", "snippet")
                .append_pair("type", "video")
                .append_pair("q", query)
                .append_pair("maxResults", &limit.to_string());
            if let Some(key) = &self.api_key {
                pairs.append_pair("key", key);
            }
        }

        debug!(query = %query, limit, "Searching videos");

        let response: SearchResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .items
            .into_iter()
            .filter_map(|item| {
                Some(VideoRef {
                    id: item.id.video_id?,
                    title: item.snippet.title,
                    channel: item.snippet.channel_title,
                })
            })
            .collect())
    }

    async fn transcript(&self, video_id: &str) -> Result<Option<String>> {
        let mut url = Url::parse(&self.transcript_url)?;
        url.query_pairs_mut().append_pair("video_id", video_id);

        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let body: TranscriptResponse = response.error_for_status()?.json().await?;
        Ok(body.transcript.filter(|t| !t.trim().is_empty()))
    }
}
