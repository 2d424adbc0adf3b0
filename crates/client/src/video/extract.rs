//! Video id and channel name extraction from link URLs.
//!
//! Feed submissions carry video links in many shapes: `watch?v=` and
//! `i=` query parameters, `/v/` and `/embed/` paths, short-host links,
//! and channel or user pages. Links are often pasted with HTML-escaped
//! ampersands or percent-encoded separators, so those are decoded
//! before matching.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static VIDEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:[?&](?:v|i)=|/(?:v|i)/|/embed/|youtu\.be/)([^"&?#/\s]+)"#).unwrap()
});

/// Path segments that name site features rather than channels.
const NON_CHANNEL_SEGMENTS: &[&str] = &["watch", "embed", "playlist", "results", "v", "feed"];

/// Extract a video id from a link URL, in any of the common shapes.
pub(crate) fn video_id(url: &str) -> Option<String> {
    let decoded = url.replace("%3D", "=").replace("%26", "&").replace("%2F", "/").replace("&amp;", "&");

    VIDEO_ID_RE.captures(&decoded).map(|caps| caps[1].to_string())
}

/// Extract a channel name from a channel or user page URL.
///
/// Takes the first path segment, skipping a `user/` or `channel/`
/// prefix. Segments that name site features are not channels.
pub(crate) fn channel_name(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());

    let first = segments.next()?;
    let name = if first.eq_ignore_ascii_case("user") || first.eq_ignore_ascii_case("channel") {
        segments.next()?
    } else {
        first
    };

    if NON_CHANNEL_SEGMENTS.iter().any(|s| name.eq_ignore_ascii_case(s)) {
        return None;
    }

    Some(name.to_string())
}
