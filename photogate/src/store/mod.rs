//! Key-value store holding sessions, login counters, and the shared photo cache.
//!
//! All mutable state of the service lives behind [`KvStore`]; handlers never keep
//! sessions or cached data in process memory.

#[cfg(test)]
mod memory;
mod redis_store;

use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Value stored under a username while that user is logged in.
pub const SESSION_MARKER: &str = "logged_in";

/// Single cache entry shared by every user.
pub const PHOTOS_CACHE_KEY: &str = "photos";

pub fn login_count_key(username: &str) -> String {
    format!("{username}:login_count")
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

#[async_trait]
pub trait KvStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// `SET key value EX ttl_seconds`.
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError>;

    /// Atomic `INCR`; returns the post-increment value.
    async fn incr(&self, key: &str) -> Result<i64, StoreError>;
}
