use std::time::Duration;

use color_eyre::eyre::{Context, Result};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use crate::ports::cache::CacheStore;

/// Cache shared by every instance of the service. Redis expires entries
/// `ttl` after they are written.
pub struct RedisCache {
    manager: ConnectionManager,
    ttl_secs: u64,
}

impl RedisCache {
    pub async fn connect(url: &str, ttl: Duration) -> Result<Self> {
        let client = redis::Client::open(url).wrap_err("Invalid Redis URL")?;
        let manager = ConnectionManager::new(client)
            .await
            .wrap_err("Failed to connect to Redis")?;

        Ok(Self {
            manager,
            // SETEX rejects a zero expiry
            ttl_secs: ttl.as_secs().max(1),
        })
    }
}

#[async_trait::async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .wrap_err_with(|| format!("Failed to read cache key {key}"))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let mut conn = self.manager.clone();
        conn.set_ex::<_, _, ()>(key, value, self.ttl_secs)
            .await
            .wrap_err_with(|| format!("Failed to write cache key {key}"))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(key)
            .await
            .wrap_err_with(|| format!("Failed to delete cache key {key}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_malformed_url_is_rejected_before_connecting() {
        let result = RedisCache::connect("not a redis url", Duration::from_secs(60)).await;

        let err = result.err().unwrap();
        assert!(format!("{err:#}").contains("Invalid Redis URL"));
    }
}
