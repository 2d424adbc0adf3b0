//! Video data API wire types.
//!
//! These are stored verbatim in the URL cache, so every type here is
//! both serializable and deserializable.

use serde::{Deserialize, Serialize};

/// One video as the data API serves it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoResource {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub channel: ChannelRef,
}

/// Channel attribution embedded in a video resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// One channel as the data API serves it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelResource {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Video metadata exposed to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub title: String,
    pub description: String,
}

impl From<VideoResource> for VideoInfo {
    fn from(video: VideoResource) -> Self {
        VideoInfo { title: video.title, description: video.description.unwrap_or_default() }
    }
}
