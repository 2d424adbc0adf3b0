//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (CLIPWATCH_*)
//! 2. TOML config file (if CLIPWATCH_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (CLIPWATCH_*)
/// 2. TOML config file (if CLIPWATCH_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API token for the feed service.
    ///
    /// Set via CLIPWATCH_FEED_TOKEN environment variable.
    /// Required before the scanner starts.
    #[serde(default)]
    pub feed_token: Option<String>,

    /// Base URL of the feed service API.
    ///
    /// Set via CLIPWATCH_FEED_API_URL environment variable.
    #[serde(default = "default_feed_api_url")]
    pub feed_api_url: String,

    /// Base URL of the feed service's public site, used to build
    /// profile links for reports.
    ///
    /// Set via CLIPWATCH_FEED_SITE_URL environment variable.
    #[serde(default = "default_feed_site_url")]
    pub feed_site_url: String,

    /// Base URL of the video host's data API.
    ///
    /// Set via CLIPWATCH_VIDEO_API_URL environment variable.
    #[serde(default = "default_video_api_url")]
    pub video_api_url: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via CLIPWATCH_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Path to the video metadata cache file.
    ///
    /// Set via CLIPWATCH_CACHE_PATH environment variable.
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// Path to the scan state file (user records + evaluated submissions).
    ///
    /// Set via CLIPWATCH_STATE_PATH environment variable.
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    /// Forum that receives spam reports.
    ///
    /// Set via CLIPWATCH_REPORT_FORUM environment variable.
    #[serde(default = "default_report_forum")]
    pub report_forum: String,

    /// Forums whose submissions are never evaluated.
    ///
    /// Set via CLIPWATCH_IGNORED_FORUMS environment variable (comma-separated).
    /// Matched case-insensitively.
    #[serde(default)]
    pub ignored_forums: Vec<String>,

    /// Users whose submissions are never evaluated.
    ///
    /// Set via CLIPWATCH_IGNORED_USERS environment variable (comma-separated).
    /// Matched case-insensitively.
    #[serde(default)]
    pub ignored_users: Vec<String>,

    /// Link domains treated as video submissions.
    ///
    /// Set via CLIPWATCH_VIDEO_DOMAINS environment variable (comma-separated).
    #[serde(default = "default_video_domains")]
    pub video_domains: Vec<String>,

    /// TTL in seconds for cached video API responses. 0 means entries
    /// never expire.
    ///
    /// Set via CLIPWATCH_VIDEO_CACHE_TTL_SECS environment variable.
    #[serde(default)]
    pub video_cache_ttl_secs: u64,

    /// Seconds to sleep between scan cycles.
    ///
    /// Set via CLIPWATCH_POLL_INTERVAL_SECS environment variable.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via CLIPWATCH_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_feed_api_url() -> String {
    "https://feed.example.com/api/v1".into()
}

fn default_feed_site_url() -> String {
    "https://feed.example.com".into()
}

fn default_video_api_url() -> String {
    "https://video.example.com/api/v3".into()
}

fn default_user_agent() -> String {
    "clipwatch/0.1".into()
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("./clipwatch-cache.json.gz")
}

fn default_state_path() -> PathBuf {
    PathBuf::from("./clipwatch-state.json.gz")
}

fn default_report_forum() -> String {
    "clipwatch-reports".into()
}

fn default_video_domains() -> Vec<String> {
    vec!["youtube.com".into(), "m.youtube.com".into(), "youtu.be".into()]
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_token: None,
            feed_api_url: default_feed_api_url(),
            feed_site_url: default_feed_site_url(),
            video_api_url: default_video_api_url(),
            user_agent: default_user_agent(),
            cache_path: default_cache_path(),
            state_path: default_state_path(),
            report_forum: default_report_forum(),
            ignored_forums: Vec::new(),
            ignored_users: Vec::new(),
            video_domains: default_video_domains(),
            video_cache_ttl_secs: 0,
            poll_interval_secs: default_poll_interval_secs(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Inter-cycle sleep as Duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `CLIPWATCH_`
    /// 2. TOML file from `CLIPWATCH_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("CLIPWATCH_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("CLIPWATCH_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Check that the feed token is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the feed token is not set.
    pub fn require_feed_token(&self) -> Result<&str, ConfigError> {
        self.feed_token.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "feed_token".into(),
            hint: "Set CLIPWATCH_FEED_TOKEN environment variable".into(),
        })
    }

    /// True when `forum` is on the ignored list (case-insensitive).
    pub fn is_ignored_forum(&self, forum: &str) -> bool {
        self.ignored_forums.iter().any(|f| f.eq_ignore_ascii_case(forum))
    }

    /// True when `user` is on the ignored list (case-insensitive).
    pub fn is_ignored_user(&self, user: &str) -> bool {
        self.ignored_users.iter().any(|u| u.eq_ignore_ascii_case(user))
    }

    /// True when `domain` is one of the configured video domains.
    pub fn is_video_domain(&self, domain: &str) -> bool {
        self.video_domains.iter().any(|d| d.eq_ignore_ascii_case(domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.cache_path, PathBuf::from("./clipwatch-cache.json.gz"));
        assert_eq!(config.state_path, PathBuf::from("./clipwatch-state.json.gz"));
        assert_eq!(config.user_agent, "clipwatch/0.1");
        assert_eq!(config.report_forum, "clipwatch-reports");
        assert_eq!(config.poll_interval_secs, 60);
        assert_eq!(config.video_cache_ttl_secs, 0);
        assert!(config.ignored_forums.is_empty());
        assert!(config.ignored_users.is_empty());
        assert!(config.feed_token.is_none());
        assert!(config.video_domains.contains(&"youtu.be".to_string()));
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_require_feed_token_missing() {
        let config = AppConfig::default();
        let result = config.require_feed_token();
        assert!(matches!(result, Err(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_require_feed_token_present() {
        let config = AppConfig { feed_token: Some("test-token".into()), ..Default::default() };
        let result = config.require_feed_token();
        assert_eq!(result.unwrap(), "test-token");
    }

    #[test]
    fn test_ignored_lists_case_insensitive() {
        let config = AppConfig {
            ignored_forums: vec!["Gaming".into()],
            ignored_users: vec!["AutoPoster".into()],
            ..Default::default()
        };
        assert!(config.is_ignored_forum("gaming"));
        assert!(config.is_ignored_forum("GAMING"));
        assert!(!config.is_ignored_forum("music"));
        assert!(config.is_ignored_user("autoposter"));
        assert!(!config.is_ignored_user("someone_else"));
    }

    #[test]
    fn test_video_domain_match() {
        let config = AppConfig::default();
        assert!(config.is_video_domain("youtube.com"));
        assert!(config.is_video_domain("YouTube.com"));
        assert!(!config.is_video_domain("example.com"));
    }
}
