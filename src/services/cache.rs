use std::collections::HashMap;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use tokio::sync::RwLock;

use crate::ports::cache::CacheStore;

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Process-local cache whose entries expire `ttl` after they are written.
///
/// Expired entries are never returned; they are dropped by `purge_expired`,
/// which the HTTP server runs periodically.
pub struct InMemoryCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Drop expired entries, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }
}

#[async_trait::async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        let now = Instant::now();

        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.write().await.insert(key.to_owned(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = InMemoryCache::new(Duration::from_secs(60));

        cache.set("album-likes:a", "3".into()).await.unwrap();

        assert_eq!(
            cache.get("album-likes:a").await.unwrap(),
            Some("3".to_string())
        );
        assert_eq!(cache.get("album-likes:b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_removes_entry() {
        let cache = InMemoryCache::new(Duration::from_secs(60));

        cache.set("key", "value".into()).await.unwrap();
        cache.delete("key").await.unwrap();
        // Deleting a missing key is not an error
        cache.delete("key").await.unwrap();

        assert_eq!(cache.get("key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_entries_are_misses_and_purged() {
        let cache = InMemoryCache::new(Duration::ZERO);

        cache.set("key", "value".into()).await.unwrap();

        assert_eq!(cache.get("key").await.unwrap(), None);
        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.purge_expired().await, 0);
    }
}
