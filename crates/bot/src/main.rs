//! clipwatch entry point.
//!
//! Boots the scanning loop against the configured feed and video services.
//! Logging goes wherever the process's stderr points; filter with RUST_LOG.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use clipwatch_client::feed::{FeedClient, FeedConfig};
use clipwatch_client::video::{VideoClient, VideoConfig};
use clipwatch_core::{AppConfig, StateStore, UrlCache};

mod scanner;

use scanner::Scanner;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load()?;
    config.require_feed_token()?;

    let feed = FeedClient::new(FeedConfig::from_app(&config)?)?;
    let video = VideoClient::new(VideoConfig::from_app(&config), UrlCache::new(config.cache_path.clone()))?;
    let store = StateStore::new(config.state_path.clone());

    tracing::info!(
        feed_api = %config.feed_api_url,
        video_api = %config.video_api_url,
        report_forum = %config.report_forum,
        poll_interval_secs = config.poll_interval_secs,
        "starting clipwatch scanner"
    );

    let mut scanner = Scanner::new(feed, video, store, config);
    scanner.run().await;

    Ok(())
}
