//! Video data API client.
//!
//! Resolves feed links against the video host's data API:
//!
//! - **Videos**: `GET {base}/videos/{id}`, metadata plus channel attribution.
//! - **Channels**: `GET {base}/channels/{name}`, for channel and user pages.
//!
//! ### Behavior
//!
//! - Only URLs on the configured video domains are resolved at all.
//! - Every API read goes through the durable URL cache with the configured
//!   TTL; failed lookups are never cached.
//! - A shared limiter enforces a fixed minimum interval between requests.
//! - All failures degrade to `None`; the caller treats an unresolvable
//!   link as unattributable rather than an error.

mod extract;

pub mod error;
pub mod response;

pub use error::VideoError;
pub use response::VideoInfo;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header;
use serde::de::DeserializeOwned;

use clipwatch_core::classify::{ChannelId, VideoLookup};
use clipwatch_core::{AppConfig, UrlCache};

use crate::limit::RateLimiter;
use crate::urls::normalized_host;
use response::{ChannelResource, VideoResource};

/// Minimum interval between video API requests.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(2);

/// Video API client configuration.
#[derive(Debug, Clone)]
pub struct VideoConfig {
    /// Data API base URL.
    pub base_url: String,
    /// Link domains treated as video links.
    pub domains: Vec<String>,
    /// Cache TTL for API responses, 0 meaning entries never expire.
    pub cache_ttl_secs: u64,
    /// Request timeout.
    pub timeout: Duration,
    /// User-agent string.
    pub user_agent: String,
}

impl VideoConfig {
    /// Build a video configuration from the application config.
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            base_url: config.video_api_url.clone(),
            domains: config.video_domains.clone(),
            cache_ttl_secs: config.video_cache_ttl_secs,
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Video data API client.
#[derive(Debug, Clone)]
pub struct VideoClient {
    http: reqwest::Client,
    config: VideoConfig,
    cache: UrlCache,
    rate_limiter: Arc<RateLimiter>,
}

impl VideoClient {
    /// Create a new video client with the given configuration and cache.
    pub fn new(config: VideoConfig, cache: UrlCache) -> Result<Self, VideoError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| VideoError::Network(Arc::new(e)))?;

        Ok(Self { http, config, cache, rate_limiter: Arc::new(RateLimiter::new(MIN_REQUEST_INTERVAL)) })
    }

    /// Extract a video id from a link URL, if it has one.
    pub fn video_id(&self, url: &str) -> Option<String> {
        extract::video_id(url)
    }

    /// Title and description of the video behind `url`.
    pub async fn video_info(&self, url: &str) -> Option<VideoInfo> {
        if !self.is_video_host(url) {
            return None;
        }

        let id = extract::video_id(url)?;
        self.lookup_video(&id).await.map(VideoInfo::from)
    }

    fn is_video_host(&self, url: &str) -> bool {
        normalized_host(url)
            .is_some_and(|host| self.config.domains.iter().any(|d| d.eq_ignore_ascii_case(&host)))
    }

    async fn lookup_video(&self, id: &str) -> Option<VideoResource> {
        let url = format!("{}/videos/{}", self.config.base_url, id);
        self.cache.get_or_fetch(&url, self.config.cache_ttl_secs, || self.request::<VideoResource>(&url)).await
    }

    async fn lookup_channel(&self, name: &str) -> Option<ChannelResource> {
        let url = format!("{}/channels/{}", self.config.base_url, name);
        self.cache
            .get_or_fetch(&url, self.config.cache_ttl_secs, || self.request::<ChannelResource>(&url))
            .await
    }

    async fn request<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
        self.rate_limiter.acquire().await;

        match self.try_request(url).await {
            Ok(value) => Some(value),
            Err(VideoError::NotFound) => {
                tracing::debug!(url, "video API resource not found");
                None
            }
            Err(err) => {
                tracing::warn!(url, error = %err, "video API request failed");
                None
            }
        }
    }

    async fn try_request<T: DeserializeOwned>(&self, url: &str) -> Result<T, VideoError> {
        let response = self.http.get(url).header(header::ACCEPT, "application/json").send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(VideoError::NotFound);
        }
        if status.is_client_error() || status.is_server_error() {
            return Err(VideoError::Http { status: status.as_u16() });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait::async_trait]
impl VideoLookup for VideoClient {
    async fn channel_for(&self, url: &str) -> Option<ChannelId> {
        if !self.is_video_host(url) {
            return None;
        }

        if let Some(id) = extract::video_id(url) {
            return self.lookup_video(&id).await.map(|video| video.channel.id);
        }

        // Not a watch link; try it as a channel or user page.
        let name = extract::channel_name(url)?;
        self.lookup_channel(&name).await.map(|channel| channel.id)
    }
}
