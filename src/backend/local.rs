//! In-process backend over the cache engine.

use std::time::Duration;

use async_trait::async_trait;

use crate::backend::CacheBackend;
use crate::cache::{CacheStats, SharedCache};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct LocalBackend {
    cache: SharedCache,
}

impl LocalBackend {
    pub fn new(cache: SharedCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }
}

#[async_trait]
impl CacheBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()> {
        self.cache.put(key, value, ttl);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.cache.get(key)
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.cache.delete(key))
    }

    async fn size(&self) -> Result<usize> {
        Ok(self.cache.size())
    }

    async fn stats(&self) -> Result<CacheStats> {
        Ok(self.cache.stats())
    }
}
