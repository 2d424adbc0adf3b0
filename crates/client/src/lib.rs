//! Client code for clipwatch.
//!
//! This crate provides the feed service API client and the video data API
//! client used by the scanner.

pub mod feed;
pub mod urls;
pub mod video;

mod limit;

pub use feed::{Comment, FeedApi, FeedClient, FeedConfig, FeedError, Submission};

pub use video::{VideoClient, VideoConfig, VideoError, VideoInfo};
