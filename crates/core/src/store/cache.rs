//! URL-keyed cache for video API responses.
//!
//! ### On-disk format
//!
//! ```json
//! { "cache": { "<url>": { "time": 1700000000, "data": { ... } } } }
//! ```
//!
//! Entries carry the unix time they were stored at; freshness is decided
//! against a TTL the caller passes on every lookup, so one file can hold
//! entries with different lifetimes.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{load_or_default, write_document};

/// One cached response: unix seconds it was stored, plus the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    time: u64,
    data: serde_json::Value,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheDocument {
    cache: HashMap<String, CacheEntry>,
}

/// Durable URL-keyed response cache.
///
/// The backing file is read in full on every lookup and rewritten in full
/// on every store. The document stays small (one entry per distinct API
/// URL) and whole-file replace keeps crash behavior trivial.
#[derive(Debug, Clone)]
pub struct UrlCache {
    path: PathBuf,
}

impl UrlCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Look up `url`, invoking `fetch` on a miss or stale entry.
    ///
    /// A `ttl_secs` of 0 means entries never expire. A fetch that yields
    /// `None` is returned as-is and never cached, so the next lookup
    /// retries. An entry whose payload no longer decodes as `T` counts as
    /// a miss.
    pub async fn get_or_fetch<T, F, Fut>(&self, url: &str, ttl_secs: u64, fetch: F) -> Option<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        let mut doc: CacheDocument = load_or_default(&self.path);
        let now = unix_now();

        if let Some(entry) = doc.cache.get(url)
            && is_fresh(entry.time, now, ttl_secs)
            && let Ok(value) = serde_json::from_value::<T>(entry.data.clone())
        {
            tracing::debug!(url, age_secs = now.saturating_sub(entry.time), "cache hit");
            return Some(value);
        }

        let value = fetch().await?;

        match serde_json::to_value(&value) {
            Ok(data) => {
                doc.cache.insert(url.to_string(), CacheEntry { time: now, data });
                if let Err(e) = write_document(&self.path, &doc) {
                    tracing::warn!(url, error = %e, "failed to persist cache entry");
                }
            }
            Err(e) => tracing::warn!(url, error = %e, "cache value does not serialize, keeping in memory only"),
        }

        Some(value)
    }
}

fn is_fresh(stored_at: u64, now: u64, ttl_secs: u64) -> bool {
    ttl_secs == 0 || now.saturating_sub(stored_at) < ttl_secs
}

fn unix_now() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temp_cache() -> (tempfile::TempDir, UrlCache) {
        let dir = tempfile::TempDir::new().unwrap();
        let cache = UrlCache::new(dir.path().join("cache.json.gz"));
        (dir, cache)
    }

    /// Write an entry with a chosen stored-at time straight to disk.
    fn seed_entry(cache: &UrlCache, url: &str, time: u64, data: Value) {
        let mut doc = CacheDocument::default();
        doc.cache.insert(url.to_string(), CacheEntry { time, data });
        write_document(&cache.path, &doc).unwrap();
    }

    #[tokio::test]
    async fn test_miss_fetches_and_stores() {
        let (_dir, cache) = temp_cache();
        let calls = AtomicUsize::new(0);

        let got: Option<Value> = cache
            .get_or_fetch("https://api/videos/a", 60, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Some(json!({"channel": "chan-a"}))
            })
            .await;

        assert_eq!(got, Some(json!({"channel": "chan-a"})));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Second lookup inside the TTL must come from disk.
        let again: Option<Value> = cache
            .get_or_fetch("https://api/videos/a", 60, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Some(json!({"channel": "other"}))
            })
            .await;

        assert_eq!(again, Some(json!({"channel": "chan-a"})));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_entry_refetched() {
        let (_dir, cache) = temp_cache();
        seed_entry(&cache, "https://api/videos/a", unix_now() - 100, json!("old"));

        let got: Option<Value> =
            cache.get_or_fetch("https://api/videos/a", 50, || async { Some(json!("new")) }).await;

        assert_eq!(got, Some(json!("new")));

        // The refreshed entry is fresh again under the same TTL.
        let again: Option<Value> = cache
            .get_or_fetch("https://api/videos/a", 50, || async { panic!("fetched a fresh entry") })
            .await;
        assert_eq!(again, Some(json!("new")));
    }

    #[tokio::test]
    async fn test_fresh_entry_not_refetched() {
        let (_dir, cache) = temp_cache();
        seed_entry(&cache, "https://api/videos/a", unix_now() - 10, json!("cached"));

        let got: Option<Value> = cache
            .get_or_fetch("https://api/videos/a", 3600, || async { panic!("fetched a fresh entry") })
            .await;

        assert_eq!(got, Some(json!("cached")));
    }

    #[tokio::test]
    async fn test_zero_ttl_never_expires() {
        let (_dir, cache) = temp_cache();
        seed_entry(&cache, "https://api/videos/a", 1, json!("ancient"));

        let got: Option<Value> = cache
            .get_or_fetch("https://api/videos/a", 0, || async { panic!("fetched under ttl 0") })
            .await;

        assert_eq!(got, Some(json!("ancient")));
    }

    #[tokio::test]
    async fn test_failed_fetch_never_cached() {
        let (_dir, cache) = temp_cache();
        let calls = AtomicUsize::new(0);

        let got: Option<Value> = cache
            .get_or_fetch("https://api/videos/a", 0, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                None
            })
            .await;
        assert_eq!(got, None);

        // The failure was not stored; the next lookup fetches again.
        let got: Option<Value> = cache
            .get_or_fetch("https://api/videos/a", 0, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Some(json!("recovered"))
            })
            .await;

        assert_eq!(got, Some(json!("recovered")));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_write_failure_still_returns_value() {
        let dir = tempfile::TempDir::new().unwrap();
        // The parent directory does not exist, so every persist fails.
        let cache = UrlCache::new(dir.path().join("missing").join("cache.json.gz"));
        let calls = AtomicUsize::new(0);

        let got: Option<Value> = cache
            .get_or_fetch("https://api/videos/a", 60, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Some(json!("fetched"))
            })
            .await;
        assert_eq!(got, Some(json!("fetched")));

        // Nothing reached disk; the next lookup fetches again.
        let again: Option<Value> = cache
            .get_or_fetch("https://api/videos/a", 60, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Some(json!("fetched"))
            })
            .await;

        assert_eq!(again, Some(json!("fetched")));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_corrupt_file_treated_as_empty() {
        let (_dir, cache) = temp_cache();
        std::fs::write(&cache.path, b"\x1f\x8b garbage").unwrap();

        let got: Option<Value> =
            cache.get_or_fetch("https://api/videos/a", 60, || async { Some(json!("fresh")) }).await;
        assert_eq!(got, Some(json!("fresh")));

        // The rewrite replaced the corrupt file with a decodable one.
        let again: Option<Value> = cache
            .get_or_fetch("https://api/videos/a", 60, || async { panic!("fetched after rewrite") })
            .await;
        assert_eq!(again, Some(json!("fresh")));
    }

    #[tokio::test]
    async fn test_type_mismatch_counts_as_miss() {
        let (_dir, cache) = temp_cache();
        seed_entry(&cache, "https://api/videos/a", unix_now(), json!("just a string"));

        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Shaped {
            channel: String,
        }

        let got: Option<Shaped> = cache
            .get_or_fetch("https://api/videos/a", 0, || async {
                Some(Shaped { channel: "chan-a".into() })
            })
            .await;

        assert_eq!(got, Some(Shaped { channel: "chan-a".into() }));
    }

    #[test]
    fn test_is_fresh_boundaries() {
        assert!(is_fresh(100, 100, 60)); // age 0
        assert!(is_fresh(100, 159, 60)); // age 59
        assert!(!is_fresh(100, 160, 60)); // age == ttl is stale
        assert!(!is_fresh(100, 200, 60));
        assert!(is_fresh(100, 1_000_000, 0)); // ttl 0 never expires
        assert!(is_fresh(200, 100, 60)); // clock went backwards, treat as fresh
    }
}
