//! Six-phase news generation pipeline.
//!
//! Each phase is one request/response round trip to the language model.
//! Fan-out inside a phase runs concurrently; the first failure aborts the
//! whole run and nothing is persisted.

use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::NewsError;
use super::extract::extract_json;
use super::prompts;
use crate::clients::{LanguageModel, SocialSource, VideoRef, VideoSource};
use crate::domain::events::NotificationEvent;
use crate::models::content::ArticleInput;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountTopic {
    pub topic: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountAnalysis {
    pub account: String,
    #[serde(default)]
    pub topics: Vec<AccountTopic>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SharedTopic {
    pub topic: String,
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CrossAnalysis {
    #[serde(default)]
    pub shared_topics: Vec<SharedTopic>,
    #[serde(default)]
    pub mentioned_accounts: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct VideoSummaryResponse {
    summary: String,
    #[serde(default)]
    key_points: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VideoSummary {
    pub video_id: String,
    pub title: String,
    pub summary: String,
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Storyline {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct StorylineResponse {
    storylines: Vec<Storyline>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeneratedArticle {
    title: String,
    summary: String,
    content: String,
    #[serde(default)]
    tags: Vec<String>,
}

/// Limits for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub accounts: Vec<String>,
    pub posts_per_account: u32,
    pub video_search_limit: u32,
    pub max_additional_accounts: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    pub articles: Vec<ArticleInput>,
    pub accounts_analyzed: usize,
    pub videos_summarized: usize,
}

pub struct NewsPipeline {
    llm: Arc<dyn LanguageModel>,
    social: Arc<dyn SocialSource>,
    video: Arc<dyn VideoSource>,
    settings: PipelineSettings,
    event_bus: Option<broadcast::Sender<NotificationEvent>>,
}

const PHASES: [&str; 6] = [
    "account analysis",
    "cross-account analysis",
    "video context",
    "additional accounts",
    "storyline consolidation",
    "content generation",
];

fn normalize_handle(handle: &str) -> String {
    handle.trim().trim_start_matches('@').to_lowercase()
}

impl NewsPipeline {
    #[must_use]
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        social: Arc<dyn SocialSource>,
        video: Arc<dyn VideoSource>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            llm,
            social,
            video,
            settings,
            event_bus: None,
        }
    }

    #[must_use]
    pub fn with_event_bus(mut self, event_bus: broadcast::Sender<NotificationEvent>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    fn enter_phase(&self, phase: u8) {
        let name = PHASES[usize::from(phase - 1)];
        info!(event = "news_phase", phase, name, "Starting news pipeline phase");
        metrics::counter!("news_pipeline_phases_total", "phase" => name).increment(1);
        if let Some(bus) = &self.event_bus {
            let _ = bus.send(NotificationEvent::NewsPipelinePhase {
                phase,
                name: name.to_string(),
            });
        }
    }

    async fn ask<T: DeserializeOwned>(&self, phase: u8, prompt: &str) -> Result<T, NewsError> {
        let response = self
            .llm
            .complete(prompts::SYSTEM, prompt)
            .await
            .map_err(|e| NewsError::Llm {
                phase,
                message: e.to_string(),
            })?;

        extract_json(&response).ok_or_else(|| {
            debug!(phase, response_len = response.len(), "Unparseable model response");
            NewsError::InvalidResponse { phase }
        })
    }

    async fn analyze_account(&self, phase: u8, account: &str) -> Result<AccountAnalysis, NewsError> {
        let posts = self
            .social
            .recent_posts(account, self.settings.posts_per_account)
            .await
            .map_err(|e| NewsError::Source {
                phase,
                message: format!("@{account}: {e}"),
            })?;

        let mut analysis: AccountAnalysis = self
            .ask(phase, &prompts::account_analysis(account, &posts))
            .await?;
        analysis.account = account.to_string();
        Ok(analysis)
    }

    async fn analyze_accounts(
        &self,
        phase: u8,
        accounts: &[String],
    ) -> Result<Vec<AccountAnalysis>, NewsError> {
        try_join_all(accounts.iter().map(|a| self.analyze_account(phase, a))).await
    }

    async fn find_videos(&self, topics: &[SharedTopic]) -> Result<Vec<(VideoRef, String)>, NewsError> {
        let limit = self.settings.video_search_limit as usize;
        let mut seen = HashSet::new();
        let mut videos = Vec::new();

        for topic in topics {
            if videos.len() >= limit {
                break;
            }

            let query = if topic.keywords.is_empty() {
                topic.topic.clone()
            } else {
                topic.keywords.join(" ")
            };

            let found = self
                .video
                .search(&query, self.settings.video_search_limit)
                .await
                .map_err(|e| NewsError::Source {
                    phase: 3,
                    message: format!("video search '{query}': {e}"),
                })?;

            for video in found {
                if videos.len() >= limit {
                    break;
                }
                if seen.insert(video.id.clone()) {
                    videos.push((video, topic.topic.clone()));
                }
            }
        }

        Ok(videos)
    }

    async fn summarize_video(
        &self,
        video: VideoRef,
        topic: String,
    ) -> Result<Option<VideoSummary>, NewsError> {
        let transcript = self
            .video
            .transcript(&video.id)
            .await
            .map_err(|e| NewsError::Source {
                phase: 3,
                message: format!("transcript {}: {e}", video.id),
            })?;

        let Some(transcript) = transcript else {
            return Ok(None);
        };

        let response: VideoSummaryResponse = self
            .ask(3, &prompts::video_summary(&video, &topic, &transcript))
            .await?;

        Ok(Some(VideoSummary {
            video_id: video.id,
            title: video.title,
            summary: response.summary,
            key_points: response.key_points,
        }))
    }

    async fn write_article(&self, storyline: &Storyline) -> Result<ArticleInput, NewsError> {
        let storyline_json = serde_json::to_string_pretty(storyline)
            .map_err(|e| NewsError::Internal(e.to_string()))?;
        let generated: GeneratedArticle = self.ask(6, &prompts::article(&storyline_json)).await?;

        Ok(ArticleInput {
            title: generated.title,
            summary: generated.summary,
            content: generated.content,
            storyline: Some(storyline.title.clone()),
            tags: generated.tags,
            sources: storyline.sources.clone(),
            published: false,
        })
    }

    /// Runs all six phases and returns the generated, unpublished articles.
    pub async fn run(&self) -> Result<PipelineOutput, NewsError> {
        if self.settings.accounts.is_empty() {
            return Err(NewsError::NoAccounts);
        }

        let started = Instant::now();

        self.enter_phase(1);
        let mut analyses = self.analyze_accounts(1, &self.settings.accounts).await?;

        self.enter_phase(2);
        let analyses_json = serde_json::to_string_pretty(&analyses)
            .map_err(|e| NewsError::Internal(e.to_string()))?;
        let cross: CrossAnalysis = self.ask(2, &prompts::cross_account(&analyses_json)).await?;

        self.enter_phase(3);
        let videos = self.find_videos(&cross.shared_topics).await?;
        let video_summaries: Vec<VideoSummary> = try_join_all(
            videos
                .into_iter()
                .map(|(video, topic)| self.summarize_video(video, topic)),
        )
        .await?
        .into_iter()
        .flatten()
        .collect();

        self.enter_phase(4);
        let analyzed: HashSet<String> = self
            .settings
            .accounts
            .iter()
            .map(|a| normalize_handle(a))
            .collect();
        let mut additional: Vec<String> = Vec::new();
        for handle in &cross.mentioned_accounts {
            let normalized = normalize_handle(handle);
            if !normalized.is_empty()
                && !analyzed.contains(&normalized)
                && !additional.contains(&normalized)
            {
                additional.push(normalized);
            }
        }
        additional.truncate(self.settings.max_additional_accounts);
        analyses.extend(self.analyze_accounts(4, &additional).await?);

        self.enter_phase(5);
        let context = serde_json::json!({
            "accounts": analyses,
            "shared_topics": cross.shared_topics,
            "videos": video_summaries,
        });
        let context_json = serde_json::to_string_pretty(&context)
            .map_err(|e| NewsError::Internal(e.to_string()))?;
        let storylines: StorylineResponse = self.ask(5, &prompts::storylines(&context_json)).await?;

        self.enter_phase(6);
        let articles = try_join_all(storylines.storylines.iter().map(|s| self.write_article(s))).await?;

        info!(
            event = "news_pipeline_finished",
            articles = articles.len(),
            accounts = analyses.len(),
            videos = video_summaries.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "News pipeline finished"
        );

        Ok(PipelineOutput {
            articles,
            accounts_analyzed: analyses.len(),
            videos_summarized: video_summaries.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::SocialPost;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedModel {
        fail_on: Option<&'static str>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(fail_on: Option<&'static str>) -> Self {
            Self {
                fail_on,
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    fn fenced(value: &serde_json::Value) -> String {
        format!("Sure.\n```json\n{value}\n```")
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, _system: &str, prompt: &str) -> anyhow::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());

            if self.fail_on.is_some_and(|marker| prompt.contains(marker)) {
                return Ok("I could not produce JSON this time.".to_string());
            }

            let body = if prompt.starts_with("Analyze the recent posts") {
                serde_json::json!({
                    "account": "ignored",
                    "topics": [{"topic": "Clash event", "summary": "Card announced", "keywords": ["clash"]}]
                })
            } else if prompt.starts_with("Below are topic analyses") {
                serde_json::json!({
                    "shared_topics": [{"topic": "Clash event", "accounts": ["urltv", "kotd"], "keywords": ["clash", "card"], "summary": "Both discuss it"}],
                    "mentioned_accounts": ["@URLTV", "rbe", "@RBE", "qotr", "extra"]
                })
            } else if prompt.starts_with("Summarize the parts") {
                serde_json::json!({"summary": "Host recap", "key_points": ["date set"]})
            } else if prompt.starts_with("Using the account analyses") {
                serde_json::json!({
                    "storylines": [
                        {"title": "Clash card", "summary": "s", "key_points": [], "sources": ["@urltv"]},
                        {"title": "League news", "summary": "s", "key_points": [], "sources": ["@kotd"]}
                    ]
                })
            } else {
                serde_json::json!({"title": "Headline", "summary": "Short", "content": "Body", "tags": ["clash"]})
            };
            Ok(fenced(&body))
        }
    }

    struct FakeSocial {
        requested: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SocialSource for FakeSocial {
        async fn recent_posts(&self, account: &str, _limit: u32) -> anyhow::Result<Vec<SocialPost>> {
            self.requested.lock().unwrap().push(account.to_string());
            Ok(vec![SocialPost {
                id: "1".into(),
                text: format!("{account} post"),
                created_at: None,
            }])
        }
    }

    struct FakeVideo;

    #[async_trait]
    impl VideoSource for FakeVideo {
        async fn search(&self, _query: &str, _limit: u32) -> anyhow::Result<Vec<VideoRef>> {
            Ok(vec![
                VideoRef {
                    id: "v1".into(),
                    title: "Recap".into(),
                    channel: "Host".into(),
                },
                VideoRef {
                    id: "v2".into(),
                    title: "No transcript".into(),
                    channel: "Host".into(),
                },
            ])
        }

        async fn transcript(&self, video_id: &str) -> anyhow::Result<Option<String>> {
            Ok((video_id == "v1").then(|| "transcript text".to_string()))
        }
    }

    fn pipeline(
        model: Arc<ScriptedModel>,
        social: Arc<FakeSocial>,
        max_additional_accounts: usize,
    ) -> NewsPipeline {
        NewsPipeline::new(
            model,
            social,
            Arc::new(FakeVideo),
            PipelineSettings {
                accounts: vec!["urltv".into(), "kotd".into()],
                posts_per_account: 10,
                video_search_limit: 3,
                max_additional_accounts,
            },
        )
    }

    fn social() -> Arc<FakeSocial> {
        Arc::new(FakeSocial {
            requested: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_full_run_generates_unpublished_articles() {
        let model = Arc::new(ScriptedModel::new(None));
        let social = social();
        let (tx, mut rx) = broadcast::channel(32);

        let output = pipeline(model.clone(), social.clone(), 5)
            .with_event_bus(tx)
            .run()
            .await
            .unwrap();

        assert_eq!(output.articles.len(), 2);
        assert!(output.articles.iter().all(|a| !a.published));
        assert_eq!(output.articles[0].storyline.as_deref(), Some("Clash card"));
        assert_eq!(output.articles[0].sources, vec!["@urltv"]);
        assert_eq!(output.videos_summarized, 1);

        let mut phases = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let NotificationEvent::NewsPipelinePhase { phase, .. } = event {
                phases.push(phase);
            }
        }
        assert_eq!(phases, vec![1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test]
    async fn test_additional_accounts_are_deduplicated_and_capped() {
        let model = Arc::new(ScriptedModel::new(None));
        let social = social();

        let output = pipeline(model, social.clone(), 2).run().await.unwrap();

        let requested = social.requested.lock().unwrap().clone();
        assert_eq!(requested[..2], ["urltv".to_string(), "kotd".to_string()]);
        assert_eq!(requested[2..], ["rbe".to_string(), "qotr".to_string()]);
        assert_eq!(output.accounts_analyzed, 4);
    }

    #[tokio::test]
    async fn test_missing_fenced_block_fails_the_run() {
        let model = Arc::new(ScriptedModel::new(Some("consolidate the material")));

        let err = pipeline(model.clone(), social(), 5).run().await.unwrap_err();

        assert!(matches!(err, NewsError::InvalidResponse { phase: 5 }));
        let prompts = model.prompts.lock().unwrap();
        assert!(!prompts.iter().any(|p| p.starts_with("Write a news article")));
    }

    #[tokio::test]
    async fn test_run_without_accounts_is_rejected() {
        let pipeline = NewsPipeline::new(
            Arc::new(ScriptedModel::new(None)),
            social(),
            Arc::new(FakeVideo),
            PipelineSettings {
                accounts: Vec::new(),
                posts_per_account: 10,
                video_search_limit: 3,
                max_additional_accounts: 0,
            },
        );
        assert!(matches!(pipeline.run().await, Err(NewsError::NoAccounts)));
    }

    #[test]
    fn test_normalize_handle() {
        assert_eq!(normalize_handle(" @URLTV "), "urltv");
        assert_eq!(normalize_handle("kotd"), "kotd");
    }
}
