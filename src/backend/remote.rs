//! Redis backend.
//!
//! Forwards SET / GET / DEL to a Redis server over one lazily opened
//! multiplexed connection.

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::backend::CacheBackend;
use crate::cache::duration_to_ms_ceil;
use crate::config::RedisConfig;
use crate::error::{CacheError, Result};

pub struct RedisBackend {
    client: Client,
    url: String,
    connection: Mutex<Option<MultiplexedConnection>>,
}

impl Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let connected = match self.connection.try_lock() {
            Ok(slot) => {
                if slot.is_some() {
                    "connected"
                } else {
                    "not_connected"
                }
            }
            Err(_) => "busy",
        };

        f.debug_struct("RedisBackend")
            .field("url", &self.url)
            .field("connection", &connected)
            .finish()
    }
}

impl RedisBackend {
    /// Validates the connection URL. No network I/O happens until the first command.
    pub fn connect(config: &RedisConfig) -> Result<Self> {
        let url = config.url();
        let client = Client::open(url.as_str())?;
        info!(url = %url, "redis backend configured");

        Ok(Self {
            client,
            url,
            connection: Mutex::new(None),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get or create the shared connection.
    async fn connection(&self) -> Result<MultiplexedConnection> {
        let mut slot = self.connection.lock().await;

        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let conn = self.client.get_multiplexed_async_connection().await?;
        debug!(url = %self.url, "redis connection established");
        *slot = Some(conn.clone());
        Ok(conn)
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.connection().await?;

        match ttl {
            None => {
                let _: () = conn.set(key, value).await?;
            }
            // PSETEX rejects 0; an already-expired write leaves the key absent
            Some(ttl) if ttl.is_zero() => {
                let _: i64 = conn.del(key).await?;
            }
            Some(ttl) => {
                let millis = duration_to_ms_ceil(ttl);
                let _: () = conn.pset_ex(key, value, millis).await?;
            }
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let mut conn = self.connection().await?;
        let value: Option<Vec<u8>> = conn.get(key).await?;
        value.ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn size(&self) -> Result<usize> {
        let mut conn = self.connection().await?;
        let count: u64 = redis::cmd("DBSIZE").query_async(&mut conn).await?;
        Ok(count as usize)
    }
}
