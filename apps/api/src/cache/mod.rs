//! Key/value cache with per-key time-to-live.
//!
//! `CacheStore` is the backend seam (memory or Redis). `Cache` is the facade
//! the rest of the service uses: backend failures are logged and read as misses,
//! never surfaced as task failures.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use glob::Pattern;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod memory;
pub mod redis_store;

pub use memory::MemoryCache;
pub use redis_store::RedisCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache value is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Overwrites unconditionally.
    async fn set(&self, key: &str, value: &Value, ttl: Duration) -> Result<(), CacheError>;

    /// Removes every key matching a glob pattern (`*`, `?`). Returns the count removed.
    async fn invalidate(&self, pattern: &str) -> Result<usize, CacheError>;
}

/// Shared, failure-tolerant cache handle.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
}

impl Cache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCache::new()))
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        match self.store.get(key).await {
            Ok(hit) => {
                debug!(key, hit = hit.is_some(), "cache lookup");
                hit
            }
            Err(e) => {
                warn!(key, "cache get failed, treating as miss: {e}");
                None
            }
        }
    }

    pub async fn set(&self, key: &str, value: &Value, ttl: Duration) -> bool {
        match self.store.set(key, value, ttl).await {
            Ok(()) => true,
            Err(e) => {
                warn!(key, "cache set failed: {e}");
                false
            }
        }
    }

    pub async fn invalidate(&self, pattern: &str) -> usize {
        match self.store.invalidate(pattern).await {
            Ok(removed) => {
                debug!(pattern, removed, "cache invalidated");
                removed
            }
            Err(e) => {
                warn!(pattern, "cache invalidate failed: {e}");
                0
            }
        }
    }
}

/// Glob match over cache keys. An unparseable pattern matches nothing.
pub fn key_matches(pattern: &str, key: &str) -> bool {
    Pattern::new(pattern).map(|p| p.matches(key)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<Value>, CacheError> {
            Err(CacheError::Serde(serde_json::from_str::<Value>("{").unwrap_err()))
        }
        async fn set(&self, _key: &str, _value: &Value, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Serde(serde_json::from_str::<Value>("{").unwrap_err()))
        }
        async fn invalidate(&self, _pattern: &str) -> Result<usize, CacheError> {
            Err(CacheError::Serde(serde_json::from_str::<Value>("{").unwrap_err()))
        }
    }

    #[test]
    fn test_key_matches_wildcards() {
        assert!(key_matches("profile:42", "profile:42"));
        assert!(key_matches("profile:*", "profile:42"));
        assert!(key_matches("*:42", "skills:42"));
        assert!(key_matches("jobs:?", "jobs:1"));
        assert!(!key_matches("jobs:?", "jobs:12"));
        assert!(!key_matches("profile:*", "skills:42"));
        assert!(key_matches("jobs:search:*", r#"jobs:search:{"skills":["go"]}"#));
    }

    #[test]
    fn test_malformed_pattern_matches_nothing() {
        assert!(!key_matches("profile:[", "profile:["));
    }

    #[tokio::test]
    async fn test_failing_backend_reads_as_miss() {
        let cache = Cache::new(Arc::new(BrokenStore));
        assert!(cache.get("k").await.is_none());
        assert!(!cache.set("k", &json!(1), Duration::from_secs(1)).await);
        assert_eq!(cache.invalidate("*").await, 0);
    }
}
