//! Memoization of resolved stream urls.
//!
//! Stream urls handed out by the provider are signed and stop working after a
//! while, so every entry carries a deadline: the configured ttl, cut shorter by
//! the `expire` timestamp embedded in the url itself when there is one.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use log::debug;
use moka::{Expiry, policy::EvictionPolicy, sync::Cache};
use reqwest::Url;

use crate::{config::CacheConfig, domain::video_id::VideoId};

/// served urls must stay valid at least this long after leaving the cache
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Per-entry lifetime of a stream url
struct UrlExpiry {
    ttl: Duration,
}

impl UrlExpiry {
    fn lifetime(&self, url: &str, wall: SystemTime) -> Duration {
        match remaining_validity(url, wall) {
            Some(remaining) => self.ttl.min(remaining),
            None => self.ttl,
        }
    }
}

impl Expiry<VideoId, String> for UrlExpiry {
    fn expire_after_create(
        &self,
        _video_id: &VideoId,
        url: &String,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(self.lifetime(url, SystemTime::now()))
    }

    fn expire_after_update(
        &self,
        _video_id: &VideoId,
        url: &String,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(self.lifetime(url, SystemTime::now()))
    }
}

/// Least recently used cache of stream urls keyed by video id
#[derive(Clone)]
pub struct StreamUrlCache {
    urls: Cache<VideoId, String>,
    ttl: Duration,
}

impl StreamUrlCache {
    pub fn new(config: &CacheConfig) -> Self {
        let ttl = Duration::from_secs(config.ttl_secs);
        let urls = Cache::builder()
            .max_capacity(config.capacity as u64)
            .eviction_policy(EvictionPolicy::lru())
            .expire_after(UrlExpiry { ttl })
            .build();

        Self { urls, ttl }
    }

    pub fn get(&self, video_id: &VideoId) -> Option<String> {
        self.urls.get(video_id)
    }

    /// Urls that are already past their own expiry are not stored
    pub fn insert(&self, video_id: VideoId, url: String) {
        let lifetime = UrlExpiry { ttl: self.ttl }.lifetime(&url, SystemTime::now());
        if lifetime.is_zero() {
            debug!("Not caching stream url for {video_id}: it expires too soon");
            return;
        }
        self.urls.insert(video_id, url);
    }

    #[cfg(test)]
    fn len(&self) -> u64 {
        self.urls.run_pending_tasks();
        self.urls.entry_count()
    }
}

/// How long the url stays usable according to its `expire` query parameter, minus the margin.
///
/// None if the url does not say.
fn remaining_validity(url: &str, wall: SystemTime) -> Option<Duration> {
    let url = Url::parse(url).ok()?;
    let expire = url
        .query_pairs()
        .find(|(key, _)| key == "expire")
        .and_then(|(_, value)| value.parse::<u64>().ok())?;

    let expire = UNIX_EPOCH + Duration::from_secs(expire);
    let remaining = expire.duration_since(wall).unwrap_or(Duration::ZERO);
    Some(remaining.saturating_sub(EXPIRY_MARGIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: usize, ttl_secs: u64) -> StreamUrlCache {
        StreamUrlCache::new(&CacheConfig { capacity, ttl_secs })
    }

    fn id(s: &str) -> VideoId {
        VideoId::parse(s).unwrap()
    }

    fn wall(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn unix_now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    #[test]
    fn test_hit_and_miss() {
        let cache = cache(10, 3600);

        cache.insert(id("a"), "https://x/a".into());

        assert_eq!(cache.get(&id("a")).as_deref(), Some("https://x/a"));
        assert_eq!(cache.get(&id("b")), None);
    }

    #[test]
    fn test_reinsert_replaces_url() {
        let cache = cache(2, 3600);

        cache.insert(id("a"), "https://x/a".into());
        cache.insert(id("b"), "https://x/b".into());
        cache.insert(id("a"), "https://x/a2".into());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&id("a")).as_deref(), Some("https://x/a2"));
        assert!(cache.get(&id("b")).is_some());
    }

    #[test]
    fn test_capacity_is_bounded() {
        let cache = cache(3, 3600);

        for n in 0..10 {
            cache.insert(id(&format!("v{n}")), format!("https://x/{n}"));
        }

        assert!(cache.len() <= 3);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = cache(2, 3600);

        cache.insert(id("a"), "https://x/a".into());
        cache.insert(id("b"), "https://x/b".into());
        cache.urls.run_pending_tasks();
        // touch a, so b becomes the oldest
        assert!(cache.get(&id("a")).is_some());
        cache.urls.run_pending_tasks();
        cache.insert(id("c"), "https://x/c".into());
        cache.urls.run_pending_tasks();

        assert!(cache.get(&id("a")).is_some());
        assert!(cache.get(&id("b")).is_none());
        assert!(cache.get(&id("c")).is_some());
    }

    #[test]
    fn test_lifetime_defaults_to_ttl() {
        let expiry = UrlExpiry {
            ttl: Duration::from_secs(60),
        };
        assert_eq!(
            expiry.lifetime("https://x/a", wall(0)),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn test_url_expiry_shortens_ttl() {
        let expiry = UrlExpiry {
            ttl: Duration::from_secs(3600),
        };
        // url says it expires 300s from the wall clock; 60s margin leaves 240s
        let url = "https://rr1.example/videoplayback?expire=1300&itag=251";

        assert_eq!(expiry.lifetime(url, wall(1000)), Duration::from_secs(240));
    }

    #[test]
    fn test_url_expiry_never_extends_ttl() {
        let expiry = UrlExpiry {
            ttl: Duration::from_secs(100),
        };
        let url = "https://rr1.example/videoplayback?expire=99999";

        assert_eq!(expiry.lifetime(url, wall(1000)), Duration::from_secs(100));
    }

    #[test]
    fn test_created_entry_gets_url_lifetime() {
        let expiry = UrlExpiry {
            ttl: Duration::from_secs(3600),
        };
        let url = format!("https://rr1.example/videoplayback?expire={}", unix_now() + 600);

        let lifetime = expiry
            .expire_after_create(&id("a"), &url, Instant::now())
            .unwrap();

        assert!(lifetime <= Duration::from_secs(540));
        assert!(lifetime > Duration::from_secs(500));
    }

    #[test]
    fn test_already_expired_url_is_not_cached() {
        let cache = cache(10, 3600);
        let url = format!("https://rr1.example/videoplayback?expire={}", unix_now() + 30);

        cache.insert(id("a"), url);

        assert_eq!(cache.get(&id("a")), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_remaining_validity() {
        assert_eq!(remaining_validity("https://x/a", wall(0)), None);
        assert_eq!(remaining_validity("not a url", wall(0)), None);
        assert_eq!(
            remaining_validity("https://x/a?expire=2000", wall(1000)),
            Some(Duration::from_secs(940))
        );
        assert_eq!(
            remaining_validity("https://x/a?expire=500", wall(1000)),
            Some(Duration::ZERO)
        );
    }
}
