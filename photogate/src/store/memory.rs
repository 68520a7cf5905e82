use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use super::{KvStore, StoreError};

/// In-process stand-in for Redis used by tests. Expiry follows tokio's clock so
/// tests can pause and advance time.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, (String, Option<Instant>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a key as if Redis had evicted it.
    pub fn evict(&self, key: &str) {
        self.inner.remove(key);
    }

    fn purge_expired(&self, key: &str) {
        self.inner
            .remove_if(key, |_, (_, expires)| expires.is_some_and(|at| at <= Instant::now()));
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.purge_expired(key);
        Ok(self.inner.get(key).map(|entry| entry.0.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        let expires = Instant::now() + Duration::from_secs(ttl_seconds);
        self.inner
            .insert(key.to_string(), (value.to_string(), Some(expires)));
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        self.purge_expired(key);
        let mut entry = self
            .inner
            .entry(key.to_string())
            .or_insert_with(|| (String::from("0"), None));
        let next = entry.0.parse::<i64>().map_err(|_| {
            redis::RedisError::from((
                redis::ErrorKind::TypeError,
                "value is not an integer or out of range",
            ))
        })? + 1;
        entry.0 = next.to_string();
        Ok(next)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::time::Duration;

    use anyhow::Result;

    use super::MemoryStore;
    use crate::store::KvStore;

    #[tokio::test]
    async fn incr_starts_at_one_and_increases() -> Result<()> {
        let store = MemoryStore::new();
        assert_eq!(store.incr("alice:login_count").await?, 1);
        assert_eq!(store.incr("alice:login_count").await?, 2);
        assert_eq!(store.incr("bob:login_count").await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn incr_rejects_non_integer_values() -> Result<()> {
        let store = MemoryStore::new();
        store.set_ex("alice", "logged_in", 60).await?;
        assert!(store.incr("alice").await.is_err());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn set_ex_expires_after_ttl() -> Result<()> {
        let store = MemoryStore::new();
        store.set_ex("photos", "[]", 30).await?;

        tokio::time::advance(Duration::from_secs(29)).await;
        assert_eq!(store.get("photos").await?.as_deref(), Some("[]"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(store.get("photos").await?, None);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn set_ex_overwrites_value_and_expiry() -> Result<()> {
        let store = MemoryStore::new();
        store.set_ex("alice", "logged_in", 10).await?;
        tokio::time::advance(Duration::from_secs(8)).await;
        store.set_ex("alice", "logged_in", 10).await?;
        tokio::time::advance(Duration::from_secs(8)).await;

        assert!(store.get("alice").await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn evict_removes_key() -> Result<()> {
        let store = MemoryStore::new();
        store.set_ex("alice", "logged_in", 3600).await?;
        store.evict("alice");
        assert_eq!(store.get("alice").await?, None);
        Ok(())
    }
}
