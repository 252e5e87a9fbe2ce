use std::sync::Arc;
use std::time::Duration;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

/// Thread-safe key/value cache with a fixed time-to-live.
///
/// Owned by the orchestration layer and injected into the market data
/// fetchers, so every cached API response has an explicit lifetime and can be
/// evicted. A disabled cache never stores anything.
#[derive(Clone)]
pub struct TtlCache<V: Clone> {
    entries: Arc<DashMap<String, CacheEntry<V>>>,
    ttl: chrono::Duration,
    enabled: bool,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration, enabled: bool) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::seconds(300)),
            enabled,
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::from_secs(0), false)
    }

    /// Get a value if it is still within its TTL
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_at(key, Utc::now())
    }

    fn get_at(&self, key: &str, now: DateTime<Utc>) -> Option<V> {
        if !self.enabled {
            return None;
        }

        if let Some(entry) = self.entries.get(key) {
            if now < entry.stored_at + self.ttl {
                return Some(entry.value.clone());
            }
            drop(entry); // Release the read lock before removing
            self.entries.remove(key);
        }
        None
    }

    pub fn insert(&self, key: &str, value: V) {
        self.insert_at(key, value, Utc::now());
    }

    fn insert_at(&self, key: &str, value: V, now: DateTime<Utc>) {
        if !self.enabled {
            return;
        }
        self.entries.insert(key.to_string(), CacheEntry { value, stored_at: now });
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop every expired entry
    pub fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| now < entry.stored_at + self.ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stores_and_returns_values() {
        let cache = TtlCache::new(Duration::from_secs(300), true);
        cache.insert("price_AAPL", 187.5_f64);

        assert_eq!(cache.get("price_AAPL"), Some(187.5));
        assert_eq!(cache.get("price_MSFT"), None);
    }

    #[test]
    fn test_expired_entries_are_evicted_on_read() {
        let cache = TtlCache::new(Duration::from_secs(60), true);
        let stored = Utc::now() - chrono::Duration::seconds(120);
        cache.insert_at("news_AAPL", "stale".to_string(), stored);

        assert_eq!(cache.get("news_AAPL"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cleanup_expired() {
        let cache = TtlCache::new(Duration::from_secs(60), true);
        cache.insert_at("old", 1, Utc::now() - chrono::Duration::seconds(61));
        cache.insert("fresh", 2);

        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("fresh"), Some(2));
    }

    #[test]
    fn test_disabled_cache_never_stores() {
        let cache: TtlCache<i32> = TtlCache::disabled();
        cache.insert("key", 1);
        assert_eq!(cache.get("key"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_invalidate() {
        let cache = TtlCache::new(Duration::from_secs(300), true);
        cache.insert("profile_TSLA", 3);
        cache.invalidate("profile_TSLA");
        assert_eq!(cache.get("profile_TSLA"), None);
    }
}
