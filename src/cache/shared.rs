//! Shared Cache Handle
//!
//! Thread-safe handle over a [`CacheStore`]. Every operation, the background
//! sweeper included, runs under one mutex and never awaits while holding it.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::cache::{CacheStats, CacheStore, Clock, FromCacheValue, IntoCacheValue};
use crate::error::Result;
use crate::keygen;

/// Cloneable handle to one cache. Clones share the same entries.
#[derive(Debug, Clone)]
pub struct SharedCache {
    inner: Arc<Mutex<CacheStore>>,
}

impl SharedCache {
    // == Lifecycle ==
    /// Opens a cache holding at most `capacity` live entries.
    pub fn open(capacity: usize) -> Result<Self> {
        Ok(Self::from_store(CacheStore::new(capacity)?))
    }

    /// Opens a cache reading time from `clock`.
    pub fn open_with_clock(capacity: usize, clock: Arc<dyn Clock>) -> Result<Self> {
        Ok(Self::from_store(CacheStore::with_clock(capacity, clock)?))
    }

    pub fn from_store(store: CacheStore) -> Self {
        info!(capacity = store.capacity(), "cache opened");
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Drops every entry and returns the final statistics.
    ///
    /// The close applies to every clone: later writes are ignored and later
    /// reads miss.
    pub fn close(self) -> CacheStats {
        let mut store = self.inner.lock();
        let stats = store.stats();
        store.close();
        info!(
            hits = stats.hits,
            misses = stats.misses,
            evictions = stats.evictions,
            "cache closed"
        );
        stats
    }

    // == Core Operations ==
    pub fn put(&self, key: impl Into<String>, value: impl IntoCacheValue, ttl: Option<Duration>) {
        let value = value.into_cache_value();
        self.inner.lock().put(key, value, ttl);
    }

    pub fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.inner.lock().get(key)
    }

    pub fn delete(&self, key: &str) -> bool {
        self.inner.lock().delete(key)
    }

    /// Live entry count; expired entries are purged first.
    pub fn size(&self) -> usize {
        self.inner.lock().size()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    pub fn cleanup_expired(&self) -> usize {
        self.inner.lock().cleanup_expired()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().is_closed()
    }

    /// Remaining TTL of a live entry. `Ok(None)` means it never expires.
    pub fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        self.inner.lock().ttl(key)
    }

    // == Convenience ==
    /// Stores `value` under a newly generated random key and returns the key.
    pub fn store(&self, value: impl IntoCacheValue, ttl: Option<Duration>) -> String {
        let key = keygen::random_key();
        self.put(key.clone(), value, ttl);
        key
    }

    /// Reads and decodes a value.
    pub fn get_as<T: FromCacheValue>(&self, key: &str) -> Result<T> {
        T::from_cache_value(self.get(key)?)
    }

    pub fn get_str(&self, key: &str) -> Result<String> {
        self.get_as(key)
    }

    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.get_as(key)
    }

    /// Read-through lookup.
    ///
    /// On a miss, `loader` runs without the lock held and its result is
    /// stored under `key` with `ttl` before being returned.
    pub fn get_or_insert_with<F, V>(&self, key: &str, ttl: Option<Duration>, loader: F) -> Vec<u8>
    where
        F: FnOnce() -> V,
        V: IntoCacheValue,
    {
        if let Ok(value) = self.get(key) {
            return value;
        }

        debug!(key, "cache miss, loading");
        let value = loader().into_cache_value();
        self.inner.lock().put(key, value.clone(), ttl);
        value
    }

    /// Fallible read-through lookup; a loader error is returned and nothing is cached.
    pub fn try_get_or_insert_with<F, V, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        loader: F,
    ) -> std::result::Result<Vec<u8>, E>
    where
        F: FnOnce() -> std::result::Result<V, E>,
        V: IntoCacheValue,
    {
        if let Ok(value) = self.get(key) {
            return Ok(value);
        }

        let value = loader()?.into_cache_value();
        self.inner.lock().put(key, value.clone(), ttl);
        Ok(value)
    }
}
