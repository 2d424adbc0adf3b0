//! Small URL helpers shared by the feed and video clients.

use url::Url;

/// Host of `url`, lowercased and with a leading `www.` stripped.
///
/// Returns `None` for anything that does not parse as an absolute URL with
/// a host.
pub fn normalized_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}
