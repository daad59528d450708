//! Remote Store Module
//!
//! The shared network cache the service prefers while it is reachable.
//! Values travel as JSON strings; the service owns (de)serialization.

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use tokio::sync::RwLock;

use crate::error::{CacheError, CacheResult};

/// Operations the cache service needs from a shared key/value store.
///
/// Implementations report every failure; the service decides how to degrade.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Establishes the connection and verifies the store answers.
    async fn connect(&self) -> CacheResult<()>;

    /// Drops the connection.
    async fn disconnect(&self) -> CacheResult<()>;

    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Writes `value` under `key`, expiring after `ttl_secs` (must be > 0).
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()>;

    async fn del(&self, keys: Vec<String>) -> CacheResult<()>;

    /// Lists keys matching the store's native glob syntax.
    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>>;

    /// Removes every key in the store.
    async fn flush_all(&self) -> CacheResult<()>;
}

// == Redis Store ==
/// Redis-backed remote store over a multiplexed tokio connection.
pub struct RedisStore {
    client: Client,
    conn: RwLock<Option<MultiplexedConnection>>,
}

impl RedisStore {
    /// Parses `url` without connecting.
    pub fn open(url: &str) -> CacheResult<Self> {
        let client = Client::open(url)?;
        Ok(Self {
            client,
            conn: RwLock::new(None),
        })
    }

    async fn connection(&self) -> CacheResult<MultiplexedConnection> {
        self.conn.read().await.clone().ok_or(CacheError::NotConnected)
    }
}

#[async_trait]
impl RemoteStore for RedisStore {
    async fn connect(&self) -> CacheResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        *self.conn.write().await = Some(conn);
        Ok(())
    }

    async fn disconnect(&self) -> CacheResult<()> {
        self.conn.write().await.take();
        Ok(())
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn del(&self, keys: Vec<String>) -> CacheResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        let _: i64 = conn.del(keys).await?;
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let mut conn = self.connection().await?;
        let keys: Vec<String> = conn.keys(pattern).await?;
        Ok(keys)
    }

    async fn flush_all(&self) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let _: () = redis::cmd("FLUSHALL").query_async(&mut conn).await?;
        Ok(())
    }
}
