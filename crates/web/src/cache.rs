//! In-process cache for rendered pages.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use yatube_db::PageNumber;

/// Default cap on stored pages.
pub const DEFAULT_MAX_ENTRIES: usize = 300;

#[derive(Debug, Clone)]
struct CachedPage {
    body: String,
    stored_at: Instant,
}

/// Rendered pages keyed by viewer and page number, each kept for a fixed TTL.
///
/// At most `max_entries` pages are held; inserting past the cap evicts the
/// oldest.
#[derive(Debug, Clone)]
pub struct PageCache {
    ttl: Duration,
    max_entries: usize,
    entries: Arc<RwLock<HashMap<String, CachedPage>>>,
}

impl PageCache {
    /// Create a cache. A zero TTL disables caching.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            max_entries: DEFAULT_MAX_ENTRIES,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Limit how many pages are held at once. Zero disables caching.
    #[must_use]
    pub const fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Cache key for a viewer (`None` for anonymous) and requested page.
    #[must_use]
    pub fn key(viewer_id: Option<&str>, page: PageNumber) -> String {
        format!("{}|{}", viewer_id.unwrap_or("-"), page.get())
    }

    const fn disabled(&self) -> bool {
        self.ttl.is_zero() || self.max_entries == 0
    }

    /// A fresh cached page, if any.
    pub async fn get(&self, key: &str) -> Option<String> {
        if self.disabled() {
            return None;
        }
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|page| page.stored_at.elapsed() < self.ttl)
            .map(|page| page.body.clone())
    }

    /// Store a rendered page, dropping expired entries and, when full, the
    /// oldest ones.
    pub async fn insert(&self, key: String, body: String) {
        if self.disabled() {
            return;
        }
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, page| now.duration_since(page.stored_at) < self.ttl);
        entries.remove(&key);
        while entries.len() >= self.max_entries {
            let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, page)| page.stored_at)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            entries.remove(&oldest);
        }
        entries.insert(
            key,
            CachedPage {
                body,
                stored_at: now,
            },
        );
    }

    /// Forget every cached page.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, fresh or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hit_within_ttl() {
        let cache = PageCache::new(Duration::from_secs(20));
        let key = PageCache::key(None, PageNumber::FIRST);

        cache.insert(key.clone(), "<html>".to_string()).await;

        assert_eq!(cache.get(&key).await.as_deref(), Some("<html>"));
    }

    #[tokio::test]
    async fn test_viewers_do_not_share_entries() {
        let cache = PageCache::new(Duration::from_secs(20));
        cache
            .insert(
                PageCache::key(Some("u1"), PageNumber::FIRST),
                "u1 page".to_string(),
            )
            .await;

        assert!(
            cache
                .get(&PageCache::key(None, PageNumber::FIRST))
                .await
                .is_none()
        );
        assert!(
            cache
                .get(&PageCache::key(Some("u2"), PageNumber::FIRST))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_full_cache_evicts_oldest() {
        let cache = PageCache::new(Duration::from_secs(20)).with_max_entries(3);
        for n in 1..=5 {
            cache
                .insert(PageCache::key(None, PageNumber::new(n)), format!("page {n}"))
                .await;
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        assert_eq!(cache.len().await, 3);
        assert!(cache.get(&PageCache::key(None, PageNumber::new(1))).await.is_none());
        assert!(cache.get(&PageCache::key(None, PageNumber::new(2))).await.is_none());
        assert_eq!(
            cache
                .get(&PageCache::key(None, PageNumber::new(5)))
                .await
                .as_deref(),
            Some("page 5")
        );
    }

    #[tokio::test]
    async fn test_many_distinct_keys_stay_within_cap() {
        let cache = PageCache::new(Duration::from_secs(20));
        for n in 0..1000 {
            cache.insert(format!("-|{n}"), "x".repeat(64)).await;
        }
        assert_eq!(cache.len().await, DEFAULT_MAX_ENTRIES);
    }

    #[tokio::test]
    async fn test_reinserting_a_key_does_not_evict_others() {
        let cache = PageCache::new(Duration::from_secs(20)).with_max_entries(2);
        cache.insert("a".to_string(), "1".to_string()).await;
        cache.insert("b".to_string(), "1".to_string()).await;
        cache.insert("b".to_string(), "2".to_string()).await;

        assert_eq!(cache.get("a").await.as_deref(), Some("1"));
        assert_eq!(cache.get("b").await.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_expired_entries_miss_and_are_purged() {
        let cache = PageCache::new(Duration::from_millis(10));
        cache.insert("a".to_string(), "old".to_string()).await;

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(cache.get("a").await.is_none());

        cache.insert("b".to_string(), "new".to_string()).await;
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_disables() {
        let cache = PageCache::new(Duration::ZERO);
        cache.insert("a".to_string(), "page".to_string()).await;

        assert!(cache.get("a").await.is_none());
        assert!(cache.is_empty().await);
    }
}
