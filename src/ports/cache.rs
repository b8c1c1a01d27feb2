use color_eyre::eyre::Result;

/// Port trait for the key/value cache used to memoize derived values such
/// as album like counts.
///
/// The backend owns expiry. Callers treat an `Err` exactly like a miss on
/// reads. Implementations live in `services::cache`, `services::redis_cache`
/// or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: String) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;
}
