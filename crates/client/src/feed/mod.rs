//! Feed service API client.
//!
//! ### Surface
//!
//! - **Listing**: `GET {base}/new`, newest submissions, cursor-paged.
//! - **History**: `GET {base}/users/{user}/submitted` and `.../comments`.
//! - **Reporting**: `POST {base}/forums/{forum}/submit`.
//! - **Authentication**: bearer token on every request.
//!
//! A shared limiter enforces a fixed minimum interval between requests;
//! there is no retry machinery beyond that.

pub mod error;
pub mod response;

pub use error::FeedError;
pub use response::{Comment, Submission};

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header;
use serde::Serialize;

use clipwatch_core::AppConfig;

use crate::limit::RateLimiter;
use response::{CommentListing, FeedListing};

/// Submissions requested per listing page.
const LISTING_LIMIT: usize = 100;

/// Minimum interval between feed requests.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(2);

/// Feed API client configuration.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Bearer token for the feed API.
    pub token: String,
    /// API base URL.
    pub base_url: String,
    /// Public site base URL, used to build profile links.
    pub site_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User-agent string.
    pub user_agent: String,
}

impl FeedConfig {
    /// Build a feed configuration from the application config.
    ///
    /// # Errors
    ///
    /// Returns `FeedError::MissingToken` when no token is configured.
    pub fn from_app(config: &AppConfig) -> Result<Self, FeedError> {
        let token = config.feed_token.clone().ok_or(FeedError::MissingToken)?;

        Ok(Self {
            token,
            base_url: config.feed_api_url.clone(),
            site_url: config.feed_site_url.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        })
    }
}

/// Operations the scanner needs from the feed service.
#[async_trait::async_trait]
pub trait FeedApi: Send + Sync {
    /// New submissions since `cursor`, oldest first.
    async fn fetch_new(&self, cursor: Option<&str>) -> Result<Vec<Submission>, FeedError>;

    /// The user's most recent submissions, capped at `limit` and filtered
    /// to those created after `since`.
    async fn fetch_user_submissions(
        &self,
        user: &str,
        limit: usize,
        since: DateTime<Utc>,
    ) -> Result<Vec<Submission>, FeedError>;

    /// The user's most recent comments, same cap and window.
    async fn fetch_user_comments(
        &self,
        user: &str,
        limit: usize,
        since: DateTime<Utc>,
    ) -> Result<Vec<Comment>, FeedError>;

    /// File a report post in `forum` linking to `url`.
    async fn submit_report(&self, forum: &str, title: &str, url: &str) -> Result<(), FeedError>;

    /// Public profile URL for `user`, used as the body of a report.
    fn user_page_url(&self, user: &str) -> String;
}

/// Feed service API client.
#[derive(Debug, Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    config: FeedConfig,
    rate_limiter: Arc<RateLimiter>,
}

impl FeedClient {
    /// Create a new feed client with the given configuration.
    pub fn new(config: FeedConfig) -> Result<Self, FeedError> {
        if config.token.is_empty() {
            return Err(FeedError::MissingToken);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| FeedError::Network(Arc::new(e)))?;

        Ok(Self { http, config, rate_limiter: Arc::new(RateLimiter::new(MIN_REQUEST_INTERVAL)) })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, FeedError> {
        self.rate_limiter.acquire().await;

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.config.token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        Ok(response)
    }
}

#[async_trait::async_trait]
impl FeedApi for FeedClient {
    async fn fetch_new(&self, cursor: Option<&str>) -> Result<Vec<Submission>, FeedError> {
        let mut url = format!("{}/new?limit={}", self.config.base_url, LISTING_LIMIT);
        if let Some(cursor) = cursor {
            url.push_str("&before=");
            url.push_str(cursor);
        }

        let response = self.get(&url).await?;
        if let Some(err) = status_error(response.status()) {
            return Err(err);
        }

        let listing: FeedListing = response.json().await.map_err(|e| FeedError::Parse(e.to_string()))?;

        // The feed serves newest first; the scanner wants arrival order.
        let mut items: Vec<Submission> = listing.items.into_iter().map(Submission::from).collect();
        items.reverse();

        tracing::debug!(count = items.len(), "fetched new submissions");
        Ok(items)
    }

    async fn fetch_user_submissions(
        &self,
        user: &str,
        limit: usize,
        since: DateTime<Utc>,
    ) -> Result<Vec<Submission>, FeedError> {
        let url = format!("{}/users/{}/submitted?limit={}", self.config.base_url, user, limit);

        let response = self.get(&url).await?;
        if let Some(err) = user_status_error(response.status(), user) {
            return Err(err);
        }

        let listing: FeedListing = response.json().await.map_err(|e| FeedError::Parse(e.to_string()))?;

        let cutoff = since.timestamp();
        Ok(listing.items.into_iter().map(Submission::from).filter(|s| s.created_utc > cutoff).collect())
    }

    async fn fetch_user_comments(
        &self,
        user: &str,
        limit: usize,
        since: DateTime<Utc>,
    ) -> Result<Vec<Comment>, FeedError> {
        let url = format!("{}/users/{}/comments?limit={}", self.config.base_url, user, limit);

        let response = self.get(&url).await?;
        if let Some(err) = user_status_error(response.status(), user) {
            return Err(err);
        }

        let listing: CommentListing = response.json().await.map_err(|e| FeedError::Parse(e.to_string()))?;

        let cutoff = since.timestamp();
        Ok(listing.items.into_iter().map(Comment::from).filter(|c| c.created_utc > cutoff).collect())
    }

    async fn submit_report(&self, forum: &str, title: &str, url: &str) -> Result<(), FeedError> {
        self.rate_limiter.acquire().await;

        let endpoint = format!("{}/forums/{}/submit", self.config.base_url, forum);
        let body = ReportRequest { title, url };

        let response = self.http.post(&endpoint).bearer_auth(&self.config.token).json(&body).send().await?;
        if let Some(err) = status_error(response.status()) {
            return Err(err);
        }

        tracing::info!(forum, title, "report submitted");
        Ok(())
    }

    fn user_page_url(&self, user: &str) -> String {
        format!("{}/users/{}", self.config.site_url, user)
    }
}

/// Body of a report submission.
#[derive(Debug, Serialize)]
struct ReportRequest<'a> {
    title: &'a str,
    url: &'a str,
}

fn status_error(status: reqwest::StatusCode) -> Option<FeedError> {
    if status == 401 || status == 403 {
        return Some(FeedError::Auth);
    }
    if status == 429 {
        return Some(FeedError::RateLimited);
    }
    if status.is_client_error() || status.is_server_error() {
        return Some(FeedError::Http { status: status.as_u16() });
    }
    None
}

/// Status mapping for user-history endpoints, where a missing or forbidden
/// account means the user cannot be classified rather than a client fault.
fn user_status_error(status: reqwest::StatusCode, user: &str) -> Option<FeedError> {
    if matches!(status.as_u16(), 403 | 404 | 410) {
        return Some(FeedError::UserInaccessible { user: user.to_string() });
    }
    status_error(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn app_config_with_token() -> AppConfig {
        AppConfig { feed_token: Some("test-token".into()), ..Default::default() }
    }

    #[test]
    fn test_config_from_app_missing_token() {
        let result = FeedConfig::from_app(&AppConfig::default());
        assert!(matches!(result, Err(FeedError::MissingToken)));
    }

    #[test]
    fn test_config_from_app() {
        let config = FeedConfig::from_app(&app_config_with_token()).unwrap();
        assert_eq!(config.token, "test-token");
        assert_eq!(config.base_url, "https://feed.example.com/api/v1");
        assert_eq!(config.site_url, "https://feed.example.com");
        assert_eq!(config.user_agent, "clipwatch/0.1");
    }

    #[test]
    fn test_client_new_empty_token() {
        let mut config = FeedConfig::from_app(&app_config_with_token()).unwrap();
        config.token = String::new();
        assert!(matches!(FeedClient::new(config), Err(FeedError::MissingToken)));
    }

    #[test]
    fn test_user_page_url() {
        let client = FeedClient::new(FeedConfig::from_app(&app_config_with_token()).unwrap()).unwrap();
        assert_eq!(client.user_page_url("clipposter"), "https://feed.example.com/users/clipposter");
    }

    #[test]
    fn test_status_mapping() {
        assert!(status_error(StatusCode::OK).is_none());
        assert!(matches!(status_error(StatusCode::UNAUTHORIZED), Some(FeedError::Auth)));
        assert!(matches!(status_error(StatusCode::FORBIDDEN), Some(FeedError::Auth)));
        assert!(matches!(status_error(StatusCode::TOO_MANY_REQUESTS), Some(FeedError::RateLimited)));
        assert!(matches!(status_error(StatusCode::BAD_GATEWAY), Some(FeedError::Http { status: 502 })));
    }

    #[test]
    fn test_user_status_mapping() {
        let err = user_status_error(StatusCode::NOT_FOUND, "ghost");
        assert!(matches!(err, Some(FeedError::UserInaccessible { user }) if user == "ghost"));

        let err = user_status_error(StatusCode::FORBIDDEN, "ghost");
        assert!(matches!(err, Some(FeedError::UserInaccessible { .. })));

        let err = user_status_error(StatusCode::GONE, "ghost");
        assert!(matches!(err, Some(FeedError::UserInaccessible { .. })));

        assert!(matches!(user_status_error(StatusCode::UNAUTHORIZED, "ghost"), Some(FeedError::Auth)));
        assert!(user_status_error(StatusCode::OK, "ghost").is_none());
    }
}
