use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::{Role, RoleWeights};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub security: SecurityConfig,

    pub ratings: RatingsConfig,

    pub analytics: AnalyticsConfig,

    pub news: NewsConfig,

    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            security: SecurityConfig::default(),
            ratings: RatingsConfig::default(),
            analytics: AnalyticsConfig::default(),
            news: NewsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Directory that stores uploaded battler images, served under `/images`.
    pub images_path: String,

    /// Maximum accepted image upload in bytes.
    pub max_image_bytes: usize,

    /// Event bus buffer size (default: 100)
    pub event_bus_buffer_size: usize,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/barscore.db".to_string(),
            log_level: "info".to_string(),
            images_path: "images".to_string(),
            max_image_bytes: 5 * 1024 * 1024,
            event_bus_buffer_size: 100,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    /// Idle minutes before a session expires.
    pub session_inactivity_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 7420,
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            secure_cookies: true,
            session_inactivity_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB
    pub argon2_memory_cost_kib: u32,

    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,

    pub min_password_length: usize,

    /// Whether new accounts can be created through `/api/auth/register`.
    pub registration_enabled: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
            min_password_length: 8,
            registration_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingsConfig {
    pub min_score: f64,

    pub max_score: f64,

    /// Weights written at startup for roles that have no stored row yet,
    /// keyed by role name. Resetting always restores the built-in defaults.
    pub default_role_weights: BTreeMap<String, f64>,
}

impl Default for RatingsConfig {
    fn default() -> Self {
        Self {
            min_score: 0.0,
            max_score: 10.0,
            default_role_weights: Role::ALL
                .iter()
                .map(|role| (role.as_str().to_string(), role.default_weight()))
                .collect(),
        }
    }
}

impl RatingsConfig {
    /// Seed weights: the documented defaults overridden by configured entries.
    pub fn seed_weights(&self) -> Result<RoleWeights> {
        let mut pairs = Vec::with_capacity(self.default_role_weights.len());
        for (name, weight) in &self.default_role_weights {
            let role = name.parse::<Role>().map_err(|e| anyhow::anyhow!(e))?;
            pairs.push((role, *weight));
        }
        Ok(RoleWeights::from_pairs(pairs))
    }

    #[must_use]
    pub fn is_valid_score(&self, score: f64) -> bool {
        score.is_finite() && score >= self.min_score && score <= self.max_score
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub refresh_enabled: bool,

    /// Six-field cron expression (with seconds) for the full refresh.
    pub refresh_cron: String,

    /// Battlers with fewer ratings are left off the leaderboard.
    pub leaderboard_min_ratings: u32,

    pub leaderboard_size: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            refresh_enabled: true,
            refresh_cron: "0 */15 * * * *".to_string(),
            leaderboard_min_ratings: 1,
            leaderboard_size: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub enabled: bool,

    /// Optional cron expression for unattended pipeline runs.
    pub cron_expression: Option<String>,

    /// Social accounts analyzed in the first phase.
    pub accounts: Vec<String>,

    pub posts_per_account: u32,

    pub video_search_limit: u32,

    /// Maximum accounts picked up in the additional-account phase.
    pub max_additional_accounts: usize,

    pub llm: LlmConfig,

    pub social: SocialConfig,

    pub video: VideoConfig,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cron_expression: None,
            accounts: vec![],
            posts_per_account: 20,
            video_search_limit: 5,
            max_additional_accounts: 5,
            llm: LlmConfig::default(),
            social: SocialConfig::default(),
            video: VideoConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible chat completions API.
    pub base_url: String,

    pub model: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    pub temperature: f32,

    pub max_tokens: u32,

    pub request_timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "BARSCORE_LLM_API_KEY".to_string(),
            temperature: 0.4,
            max_tokens: 4096,
            request_timeout_seconds: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    pub base_url: String,

    pub bearer_token_env: String,

    pub request_timeout_seconds: u64,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.twitter.com/2".to_string(),
            bearer_token_env: "BARSCORE_SOCIAL_TOKEN".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub base_url: String,

    /// Endpoint returning a transcript for `?video_id=`.
    pub transcript_url: String,

    pub api_key_env: String,

    pub request_timeout_seconds: u64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            transcript_url: "http://localhost:8085/transcript".to_string(),
            api_key_env: "BARSCORE_VIDEO_API_KEY".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = HashMap::new();
        labels.insert("app".to_string(), "barscore".to_string());

        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("barscore").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".barscore").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_path.trim().is_empty() {
            anyhow::bail!("Database path cannot be empty");
        }

        if !self.ratings.min_score.is_finite()
            || !self.ratings.max_score.is_finite()
            || self.ratings.min_score >= self.ratings.max_score
        {
            anyhow::bail!(
                "Rating range is invalid: min {} must be below max {}",
                self.ratings.min_score,
                self.ratings.max_score
            );
        }

        let weights = self
            .ratings
            .seed_weights()
            .context("Invalid default role weights")?;
        if let Some((role, weight)) = weights
            .iter()
            .find(|(_, w)| !crate::domain::scoring::is_valid_weight(*w))
        {
            anyhow::bail!("Default weight for role {role} must be >= 0, got {weight}");
        }

        if self.analytics.refresh_enabled && self.analytics.refresh_cron.trim().is_empty() {
            anyhow::bail!("Analytics refresh cron cannot be empty when refresh is enabled");
        }

        if self.news.enabled && self.news.llm.base_url.is_empty() {
            anyhow::bail!("LLM base URL cannot be empty when the news pipeline is enabled");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 7420);
        assert!((config.ratings.max_score - 10.0).abs() < f64::EPSILON);
        assert!(!config.news.enabled);
        assert_eq!(config.ratings.default_role_weights.len(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[ratings]"));
        assert!(toml_str.contains("[news.llm]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [ratings]
            max_score = 5.0

            [news]
            accounts = ["battlerapnews", "urltv"]
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert!((config.ratings.max_score - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.news.accounts.len(), 2);
        assert_eq!(config.server.port, 7420);
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let mut config = Config::default();
        config.ratings.min_score = 10.0;
        config.ratings.max_score = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_weight() {
        let mut config = Config::default();
        config
            .ratings
            .default_role_weights
            .insert("fan".to_string(), -1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_role() {
        let mut config = Config::default();
        config
            .ratings
            .default_role_weights
            .insert("moderator".to_string(), 1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_score_range() {
        let ratings = RatingsConfig::default();
        assert!(ratings.is_valid_score(0.0));
        assert!(ratings.is_valid_score(10.0));
        assert!(!ratings.is_valid_score(10.5));
        assert!(!ratings.is_valid_score(f64::NAN));
    }
}
