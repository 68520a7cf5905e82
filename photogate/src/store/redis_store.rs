use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{KvStore, StoreError};

/// Redis-backed store. The connection is opened lazily so the server can start
/// while Redis is down; each call retries the connection until it succeeds.
pub struct RedisStore {
    client: Client,
    manager: Mutex<Option<ConnectionManager>>,
}

impl RedisStore {
    /// Parses the URL only; no network I/O happens here.
    pub fn open(redis_url: &str) -> Result<Self, StoreError> {
        Ok(Self {
            client: Client::open(redis_url)?,
            manager: Mutex::new(None),
        })
    }

    /// Establish the connection now instead of on first use.
    pub async fn connect(&self) -> Result<(), StoreError> {
        self.connection().await.map(|_| ())
    }

    async fn connection(&self) -> Result<ConnectionManager, StoreError> {
        if let Some(manager) = self.manager.lock().await.as_ref() {
            return Ok(manager.clone());
        }

        // The lock is not held across the connect attempt; the first manager stored wins.
        let config = ConnectionManagerConfig::new().set_number_of_retries(1);
        let manager = self
            .client
            .get_connection_manager_with_config(config)
            .await?;

        let mut guard = self.manager.lock().await;
        match guard.as_ref() {
            Some(existing) => Ok(existing.clone()),
            None => {
                info!("connected to redis");
                *guard = Some(manager.clone());
                Ok(manager)
            }
        }
    }

    #[cfg(test)]
    fn is_connected(&self) -> bool {
        self.manager
            .try_lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        debug!(key, hit = value.is_some(), "redis GET");
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let () = conn.set_ex(key, value, ttl_seconds).await?;
        debug!(key, ttl_seconds, "redis SET EX");
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut conn = self.connection().await?;
        let value: i64 = conn.incr(key, 1).await?;
        debug!(key, value, "redis INCR");
        Ok(value)
    }
}
