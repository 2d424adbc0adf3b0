//! Feed API wire types and normalization.

use serde::{Deserialize, Serialize};

use crate::urls::normalized_host;

/// Raw submission listing page from the feed API.
#[derive(Debug, Deserialize)]
pub struct FeedListing {
    pub items: Vec<RawSubmission>,
}

/// One submission exactly as the feed serves it.
#[derive(Debug, Deserialize)]
pub struct RawSubmission {
    pub id: String,
    /// Absent for deleted accounts.
    #[serde(default)]
    pub author: Option<String>,
    pub url: String,
    /// Some endpoints omit the precomputed domain.
    #[serde(default)]
    pub domain: Option<String>,
    pub forum: String,
    pub created_utc: i64,
}

/// Raw comment listing page from the feed API.
#[derive(Debug, Deserialize)]
pub struct CommentListing {
    pub items: Vec<RawComment>,
}

#[derive(Debug, Deserialize)]
pub struct RawComment {
    pub id: String,
    pub submission_id: String,
    pub created_utc: i64,
}

/// Normalized submission used across the bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    /// `None` when the author account is deleted.
    pub author: Option<String>,
    pub url: String,
    /// Link domain, lowercased with any `www.` prefix dropped.
    pub domain: String,
    pub forum: String,
    pub created_utc: i64,
}

/// Normalized comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    /// Submission whose thread the comment lives in.
    pub submission_id: String,
    pub created_utc: i64,
}

impl From<RawSubmission> for Submission {
    fn from(raw: RawSubmission) -> Self {
        let domain = raw
            .domain
            .map(|d| {
                let d = d.to_ascii_lowercase();
                d.strip_prefix("www.").unwrap_or(&d).to_string()
            })
            .or_else(|| normalized_host(&raw.url))
            .unwrap_or_default();

        Submission {
            id: raw.id,
            author: raw.author,
            url: raw.url,
            domain,
            forum: raw.forum,
            created_utc: raw.created_utc,
        }
    }
}

impl From<RawComment> for Comment {
    fn from(raw: RawComment) -> Self {
        Comment { id: raw.id, submission_id: raw.submission_id, created_utc: raw.created_utc }
    }
}
