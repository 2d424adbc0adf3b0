//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - any base URL or path is empty
    /// - `user_agent` or `report_forum` is empty
    /// - `poll_interval_secs` is 0
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("feed_api_url", &self.feed_api_url),
            ("feed_site_url", &self.feed_site_url),
            ("video_api_url", &self.video_api_url),
            ("user_agent", &self.user_agent),
            ("report_forum", &self.report_forum),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Invalid { field: field.into(), reason: "must not be empty".into() });
            }
        }

        if self.cache_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid { field: "cache_path".into(), reason: "must not be empty".into() });
        }
        if self.state_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid { field: "state_path".into(), reason: "must not be empty".into() });
        }
        if self.cache_path == self.state_path {
            return Err(ConfigError::Invalid {
                field: "state_path".into(),
                reason: "must not point at the same file as cache_path".into(),
            });
        }

        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "poll_interval_secs".into(),
                reason: "must be at least 1 second".into(),
            });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.video_domains.is_empty() {
            tracing::warn!("video_domains is empty; no submission will ever be evaluated");
        }

        Ok(())
    }
}
