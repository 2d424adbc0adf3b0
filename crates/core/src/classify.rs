//! Promotion-ring detection over a user's recent activity.
//!
//! ### Decision
//!
//! A user is flagged when nearly every link in their recent history is a
//! video and nearly all of those videos belong to one channel. The same
//! channel must also own the video behind the submission that triggered
//! the check. Comments count toward the user's activity footprint, with
//! comments left under their own video submissions treated as
//! self-promotion rather than engagement.
//!
//! The decision is pure: callers fetch and window the history, and link
//! attribution goes through the [`VideoLookup`] seam.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// Identity of the account that owns a video on the video host.
pub type ChannelId = String;

/// How far back history fetches reach, in days.
pub const HISTORY_WINDOW_DAYS: i64 = 180;

/// Cap on submissions and on comments examined per evaluation.
pub const HISTORY_LIMIT: usize = 100;

/// Share of video links that must belong to a single channel.
const DOMINANT_CHANNEL_THRESHOLD: f64 = 0.85;

/// Share of overall activity that must be promotion-shaped.
const PROMOTION_ACTIVITY_THRESHOLD: f64 = 0.85;

/// Fewer video submissions than this is not enough evidence either way.
const MIN_VIDEO_SUBMISSIONS: usize = 3;

/// Resolves a link URL to the channel that owns the video behind it.
///
/// Implementations return `None` for anything that is not a resolvable
/// video or channel link; the classifier treats `None` as a non-video link.
#[async_trait::async_trait]
pub trait VideoLookup: Send + Sync {
    async fn channel_for(&self, url: &str) -> Option<ChannelId>;
}

/// One submission from the evaluated user's recent history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedLink {
    pub id: String,
    pub url: String,
}

/// One comment from the evaluated user's recent history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthoredComment {
    /// Id of the submission the comment thread is rooted at.
    pub submission_id: String,
}

/// A user's recent activity, already windowed and capped by the caller.
#[derive(Debug, Clone, Default)]
pub struct UserHistory {
    pub submissions: Vec<SubmittedLink>,
    pub comments: Vec<AuthoredComment>,
}

/// Why a user was flagged.
#[derive(Debug, Clone, PartialEq)]
pub struct Evidence {
    /// Channel the account promotes.
    pub channel: ChannelId,
    /// Video links attributed to that channel.
    pub channel_links: usize,
    /// Video links across the whole history.
    pub video_links: usize,
    /// `channel_links` over `video_links`.
    pub video_fraction: f64,
    /// Promotion-shaped activity over all activity examined.
    pub activity_ratio: f64,
    /// Comments the user left under their own video submissions.
    pub comments_on_own: usize,
}

/// Outcome of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// The account's history is dominated by one channel's videos.
    Promoter(Evidence),
    /// Not enough signal, or the activity does not match the pattern.
    Clean,
}

impl Verdict {
    pub fn is_promoter(&self) -> bool {
        matches!(self, Verdict::Promoter(_))
    }
}

/// Evaluate one user's history against the promotion pattern.
///
/// `trigger_url` is the link of the submission that prompted the check. The
/// verdict is `Clean` whenever the evidence is insufficient: an
/// unattributable trigger, a history without video links, or too few video
/// submissions to judge.
pub async fn evaluate<V: VideoLookup>(lookup: &V, trigger_url: &str, history: &UserHistory) -> Verdict {
    let Some(initial_author) = lookup.channel_for(trigger_url).await else {
        tracing::debug!(url = trigger_url, "trigger link not attributable");
        return Verdict::Clean;
    };

    let mut per_channel: HashMap<ChannelId, usize> = HashMap::new();
    let mut own_video_submissions: HashSet<&str> = HashSet::new();

    for item in &history.submissions {
        if let Some(channel) = lookup.channel_for(&item.url).await {
            *per_channel.entry(channel).or_insert(0) += 1;
            own_video_submissions.insert(item.id.as_str());
        }
    }

    let video_links: usize = per_channel.values().sum();
    if video_links == 0 {
        return Verdict::Clean;
    }

    // video_links > 0 implies at least one submission, so the activity
    // denominator is never zero.
    let Some((channel, channel_links)) = dominant_channel(&per_channel) else {
        return Verdict::Clean;
    };

    let comments_on_own = history
        .comments
        .iter()
        .filter(|c| own_video_submissions.contains(c.submission_id.as_str()))
        .count();

    let video_fraction = channel_links as f64 / video_links as f64;
    let examined = history.submissions.len() + history.comments.len();
    let activity_ratio = (video_links + comments_on_own) as f64 / examined as f64;

    tracing::debug!(
        channel,
        video_links,
        channel_links,
        comments_on_own,
        video_fraction,
        activity_ratio,
        "history profile"
    );

    if video_fraction > DOMINANT_CHANNEL_THRESHOLD
        && video_links >= MIN_VIDEO_SUBMISSIONS
        && activity_ratio > PROMOTION_ACTIVITY_THRESHOLD
        && initial_author == channel
    {
        Verdict::Promoter(Evidence {
            channel: channel.to_string(),
            channel_links,
            video_links,
            video_fraction,
            activity_ratio,
            comments_on_own,
        })
    } else {
        Verdict::Clean
    }
}

/// Channel with the most attributed links. Ties resolve to the lexically
/// smallest id so repeated runs over the same history agree.
fn dominant_channel(counts: &HashMap<ChannelId, usize>) -> Option<(&str, usize)> {
    counts
        .iter()
        .map(|(id, n)| (id.as_str(), *n))
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
}
