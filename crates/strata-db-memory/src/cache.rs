//! TTL cache backed by moka.
//!
//! Each entry carries its own time-to-live, as passed to
//! [`CacheAdapter::put`]; re-inserting a key restarts its TTL.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use serde_json::Value;
use strata_storage::CacheAdapter;

/// Default cache capacity (number of entries)
const DEFAULT_CACHE_CAPACITY: u64 = 1_000;

type Entry = (Value, Duration);

struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.1)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.1)
    }
}

/// In-process cache adapter.
#[derive(Clone)]
pub struct MokaCache {
    inner: Cache<String, Entry>,
}

impl MokaCache {
    /// Creates a cache with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Creates a cache holding at most `capacity` entries.
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .expire_after(PerEntryTtl)
                .build(),
        }
    }
}

impl Default for MokaCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheAdapter for MokaCache {
    async fn get(&self, key: &str) -> Option<Value> {
        self.inner.get(key).await.map(|(value, _)| value)
    }

    async fn put(&self, key: &str, value: Value, ttl: Duration) {
        self.inner.insert(key.to_string(), (value, ttl)).await;
    }

    async fn delete(&self, key: &str) {
        self.inner.invalidate(key).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_get_delete() {
        let cache = MokaCache::new();
        assert!(cache.get("config").await.is_none());

        cache.put("config", json!({"a": 1}), Duration::from_secs(60)).await;
        assert_eq!(cache.get("config").await, Some(json!({"a": 1})));

        cache.delete("config").await;
        assert!(cache.get("config").await.is_none());
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let cache = MokaCache::new();
        cache.put("short", json!(true), Duration::from_millis(20)).await;
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(cache.get("short").await.is_none());
    }
}
