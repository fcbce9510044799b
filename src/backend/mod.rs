//! Backend Module
//!
//! One interface over the stores the service can front: the in-process
//! cache engine or a remote Redis server.

mod local;
mod remote;

pub use self::local::LocalBackend;
pub use self::remote::RedisBackend;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::cache::CacheStats;
use crate::config::{BackendKind, Config};
use crate::error::{CacheError, Result};
use crate::keygen;

/// Key-value store reached through SET / GET / DEL.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short name used in logs and health responses.
    fn name(&self) -> &'static str;

    /// Stores `value` under `key`; `ttl` of None means no expiration.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()>;

    /// Returns the value or `CacheError::NotFound`.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Returns whether a key was removed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Number of live keys.
    async fn size(&self) -> Result<usize>;

    async fn stats(&self) -> Result<CacheStats> {
        Err(CacheError::Unsupported(format!(
            "statistics are not available for the {} backend",
            self.name()
        )))
    }

    /// Stores `value` under a newly generated random key and returns the key.
    async fn store(&self, value: Vec<u8>, ttl: Option<Duration>) -> Result<String> {
        let key = keygen::random_key();
        self.set(&key, value, ttl).await?;
        Ok(key)
    }
}

/// Builds the backend selected by `config`.
///
/// The memory backend is returned alongside its [`SharedCache`] handle so the
/// caller can run the sweeper and close it on shutdown.
///
/// [`SharedCache`]: crate::cache::SharedCache
pub fn from_config(
    config: &Config,
) -> Result<(Arc<dyn CacheBackend>, Option<crate::cache::SharedCache>)> {
    config.validate()?;
    match config.backend {
        BackendKind::Memory => {
            let cache = crate::cache::SharedCache::open(config.max_entries)?;
            Ok((Arc::new(LocalBackend::new(cache.clone())), Some(cache)))
        }
        BackendKind::Redis => Ok((Arc::new(RedisBackend::connect(&config.redis)?), None)),
    }
}
