//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and TTL expiration.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Clock, LruTracker, SystemClock};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Bounded cache storage with LRU eviction and lazy TTL expiration.
///
/// Not synchronized; wrap it in a [`SharedCache`](crate::cache::SharedCache)
/// to share it between callers.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// LRU access tracker
    lru: LruTracker,
    /// (expires_at, key) for every entry carrying a TTL, soonest first
    expirations: BTreeSet<(u64, String)>,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of live entries
    capacity: usize,
    clock: Arc<dyn Clock>,
    /// Set by `close`; writes are dropped afterwards
    closed: bool,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new CacheStore reading time from the system clock.
    ///
    /// # Errors
    /// `InvalidConfig` when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_clock(capacity, Arc::new(SystemClock))
    }

    /// Creates a new CacheStore with a custom clock.
    pub fn with_clock(capacity: usize, clock: Arc<dyn Clock>) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "cache capacity must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            expirations: BTreeSet::new(),
            stats: CacheStats::new(),
            capacity,
            clock,
            closed: false,
        })
    }

    // == Put ==
    /// Stores a key-value pair with optional TTL.
    ///
    /// If the key already exists, the entry is replaced and its TTL reset.
    /// A new key arriving at capacity first purges expired entries and, if
    /// the cache is still full, evicts the least recently used entry.
    ///
    /// A closed store ignores writes.
    pub fn put(&mut self, key: impl Into<String>, value: Vec<u8>, ttl: Option<Duration>) {
        let key = key.into();
        if self.closed {
            debug!(key = %key, "write to closed cache dropped");
            return;
        }
        let now = self.clock.now_nanos();

        if let Some(old) = self.entries.get(&key) {
            if let Some(expires) = old.expires_at {
                self.expirations.remove(&(expires, key.clone()));
            }
        } else if self.entries.len() >= self.capacity {
            self.purge_expired(now);
            while self.entries.len() >= self.capacity {
                if !self.evict_oldest() {
                    break;
                }
            }
        }

        let entry = CacheEntry::new(value, ttl, now);
        if let Some(expires) = entry.expires_at {
            self.expirations.insert((expires, key.clone()));
        }
        self.lru.touch(&key);
        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the value if found and not expired, marking it most recently
    /// used. An expired entry is removed and reported as `NotFound`.
    pub fn get(&mut self, key: &str) -> Result<Vec<u8>> {
        let now = self.clock.now_nanos();

        let expired = match self.entries.get_mut(key) {
            None => {
                self.stats.record_miss();
                return Err(CacheError::NotFound(key.to_string()));
            }
            Some(entry) if entry.is_expired_at(now) => true,
            Some(entry) => {
                entry.touch(now);
                false
            }
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            debug!(key, "expired on read");
            return Err(CacheError::NotFound(key.to_string()));
        }

        self.lru.touch(key);
        self.stats.record_hit();
        self.entries
            .get(key)
            .map(|entry| entry.value.clone())
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    // == Peek ==
    /// Reads a live entry without touching it or counting a hit/miss.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry> {
        let now = self.clock.now_nanos();
        self.entries.get(key).filter(|entry| !entry.is_expired_at(now))
    }

    /// Remaining TTL of a live entry, `Ok(None)` when it never expires.
    pub fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let now = self.clock.now_nanos();
        self.peek(key)
            .map(|entry| entry.ttl_remaining(now))
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    // == Delete ==
    /// Removes an entry by key.
    ///
    /// Returns whether a live entry was removed. An expired entry is purged
    /// but reported as `false` since it was already absent to readers.
    pub fn delete(&mut self, key: &str) -> bool {
        let now = self.clock.now_nanos();
        match self.remove_entry(key) {
            Some(entry) if entry.is_expired_at(now) => {
                self.stats.record_expirations(1);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    // == Size ==
    /// Counts live entries, purging any expired ones first.
    pub fn size(&mut self) -> usize {
        self.cleanup_expired();
        self.entries.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_nanos();
        self.purge_expired(now)
    }

    /// Drops every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.expirations.clear();
        self.stats.set_total_entries(0);
    }

    /// Drops every entry and stops accepting writes. Reads then miss.
    pub fn close(&mut self) {
        self.clear();
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Entries held, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Internals ==
    fn purge_expired(&mut self, now: u64) -> usize {
        let mut removed = 0;
        while let Some((expires, _)) = self.expirations.first() {
            if *expires > now {
                break;
            }
            if let Some((_, key)) = self.expirations.pop_first() {
                self.entries.remove(&key);
                self.lru.remove(&key);
                removed += 1;
            }
        }

        if removed > 0 {
            self.stats.record_expirations(removed);
            self.stats.set_total_entries(self.entries.len());
            debug!(removed, "purged expired entries");
        }
        removed
    }

    fn evict_oldest(&mut self) -> bool {
        match self.lru.evict_oldest() {
            Some(key) => {
                if let Some(entry) = self.entries.remove(&key) {
                    if let Some(expires) = entry.expires_at {
                        self.expirations.remove(&(expires, key.clone()));
                    }
                }
                self.stats.record_eviction();
                debug!(key = %key, "evicted least recently used entry");
                true
            }
            None => false,
        }
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.lru.remove(key);
        if let Some(expires) = entry.expires_at {
            self.expirations.remove(&(expires, key.to_string()));
        }
        self.stats.set_total_entries(self.entries.len());
        Some(entry)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    fn store_with_clock(capacity: usize) -> (CacheStore, ManualClock) {
        let clock = ManualClock::new(Duration::from_secs(1));
        let store = CacheStore::with_clock(capacity, Arc::new(clock.clone())).unwrap();
        (store, clock)
    }

    #[test]
    fn test_store_new() {
        let store = CacheStore::new(100).unwrap();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.capacity(), 100);
    }

    #[test]
    fn test_store_rejects_zero_capacity() {
        assert!(matches!(
            CacheStore::new(0),
            Err(CacheError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_store_put_and_get() {
        let mut store = CacheStore::new(100).unwrap();

        store.put("key1", b"value1".to_vec(), None);

        assert_eq!(store.get("key1").unwrap(), b"value1");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = CacheStore::new(100).unwrap();
        assert!(matches!(store.get("nonexistent"), Err(CacheError::NotFound(_))));
    }

    #[test]
    fn test_store_delete() {
        let mut store = CacheStore::new(100).unwrap();

        store.put("key1", b"value1".to_vec(), None);

        assert!(store.delete("key1"));
        assert!(store.is_empty());
        assert!(matches!(store.get("key1"), Err(CacheError::NotFound(_))));
    }

    #[test]
    fn test_store_delete_nonexistent_is_noop() {
        let mut store = CacheStore::new(100).unwrap();
        store.put("kept", b"v".to_vec(), None);

        assert!(!store.delete("nonexistent"));
        assert!(!store.delete("nonexistent"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_store_overwrite_refreshes_entry() {
        let (mut store, clock) = store_with_clock(100);

        store.put("key1", b"value1".to_vec(), Some(Duration::from_secs(1)));
        clock.advance(Duration::from_millis(900));
        store.put("key1", b"value2".to_vec(), Some(Duration::from_secs(1)));
        clock.advance(Duration::from_millis(900));

        assert_eq!(store.get("key1").unwrap(), b"value2");
        assert_eq!(store.len(), 1);
        assert_eq!(store.peek("key1").unwrap().created_at, 1_900_000_000);
    }

    #[test]
    fn test_store_overwrite_can_drop_ttl() {
        let (mut store, clock) = store_with_clock(100);

        store.put("key1", b"a".to_vec(), Some(Duration::from_secs(1)));
        store.put("key1", b"b".to_vec(), None);
        clock.advance(Duration::from_secs(10));

        assert_eq!(store.size(), 1);
        assert_eq!(store.get("key1").unwrap(), b"b");
    }

    #[test]
    fn test_store_ttl_expiration() {
        let (mut store, clock) = store_with_clock(100);

        store.put("key1", b"value1".to_vec(), Some(Duration::from_secs(1)));

        clock.advance(Duration::from_millis(999));
        assert!(store.get("key1").is_ok());

        clock.advance(Duration::from_millis(1));
        assert!(matches!(store.get("key1"), Err(CacheError::NotFound(_))));
        assert_eq!(store.len(), 0, "expired entry is removed lazily on read");
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_closed_drops_writes() {
        let mut store = CacheStore::new(10).unwrap();
        store.put("a", b"1".to_vec(), None);

        store.close();
        store.put("b", b"2".to_vec(), None);

        assert!(store.is_closed());
        assert!(store.is_empty());
        assert!(matches!(store.get("a"), Err(CacheError::NotFound(_))));
        assert!(matches!(store.get("b"), Err(CacheError::NotFound(_))));
    }

    #[test]
    fn test_store_sub_millisecond_ttl() {
        let (mut store, clock) = store_with_clock(100);

        store.put("short", b"v".to_vec(), Some(Duration::from_micros(500)));
        assert_eq!(store.get("short").unwrap(), b"v");

        clock.advance(Duration::from_micros(499));
        assert!(store.get("short").is_ok());

        clock.advance(Duration::from_micros(1));
        assert!(matches!(store.get("short"), Err(CacheError::NotFound(_))));
    }

    #[test]
    fn test_store_fractional_millisecond_ttl() {
        let (mut store, clock) = store_with_clock(100);

        store.put("k", b"v".to_vec(), Some(Duration::from_micros(1_900)));

        clock.advance(Duration::from_millis(1));
        assert!(store.get("k").is_ok());

        clock.advance(Duration::from_micros(899));
        assert!(store.get("k").is_ok());

        clock.advance(Duration::from_micros(1));
        assert!(store.get("k").is_err());
    }

    #[test]
    fn test_store_zero_ttl_is_immediately_absent() {
        let mut store = CacheStore::new(1).unwrap();

        store.put("a", b"1".to_vec(), Some(Duration::ZERO));

        assert!(matches!(store.get("a"), Err(CacheError::NotFound(_))));
    }

    #[test]
    fn test_store_lru_eviction() {
        let mut store = CacheStore::new(3).unwrap();

        store.put("key1", b"value1".to_vec(), None);
        store.put("key2", b"value2".to_vec(), None);
        store.put("key3", b"value3".to_vec(), None);

        // Cache is full, adding key4 should evict key1 (oldest)
        store.put("key4", b"value4".to_vec(), None);

        assert_eq!(store.len(), 3);
        assert_eq!(store.stats().evictions, 1);
        assert!(matches!(store.get("key1"), Err(CacheError::NotFound(_))));
        assert!(store.get("key2").is_ok());
        assert!(store.get("key3").is_ok());
        assert!(store.get("key4").is_ok());
    }

    #[test]
    fn test_store_lru_touch_on_get() {
        let mut store = CacheStore::new(2).unwrap();

        store.put("a", b"1".to_vec(), None);
        store.put("b", b"2".to_vec(), None);
        store.get("a").unwrap();
        store.put("c", b"3".to_vec(), None);

        assert!(matches!(store.get("b"), Err(CacheError::NotFound(_))));
        assert_eq!(store.get("a").unwrap(), b"1");
        assert_eq!(store.get("c").unwrap(), b"3");
        assert_eq!(store.size(), 2);
    }

    #[test]
    fn test_store_tie_break_is_insertion_order() {
        // Frozen clock: every entry shares the same last_accessed_at
        let (mut store, _clock) = store_with_clock(3);

        store.put("first", b"1".to_vec(), None);
        store.put("second", b"2".to_vec(), None);
        store.put("third", b"3".to_vec(), None);
        store.put("fourth", b"4".to_vec(), None);

        assert!(store.peek("first").is_none());
        assert!(store.peek("second").is_some());
    }

    #[test]
    fn test_store_overflow_prefers_expired_entries() {
        let (mut store, clock) = store_with_clock(2);

        store.put("old_live", b"1".to_vec(), None);
        store.put("short", b"2".to_vec(), Some(Duration::from_millis(10)));
        clock.advance(Duration::from_millis(20));

        store.put("new", b"3".to_vec(), None);

        assert_eq!(store.get("old_live").unwrap(), b"1");
        assert_eq!(store.get("new").unwrap(), b"3");
        let stats = store.stats();
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.expirations, 1);
    }

    #[test]
    fn test_store_overwrite_at_capacity_does_not_evict() {
        let mut store = CacheStore::new(2).unwrap();

        store.put("a", b"1".to_vec(), None);
        store.put("b", b"2".to_vec(), None);
        store.put("a", b"updated".to_vec(), None);

        assert_eq!(store.len(), 2);
        assert_eq!(store.stats().evictions, 0);
        assert_eq!(store.get("b").unwrap(), b"2");
    }

    #[test]
    fn test_store_delete_expired_reports_false() {
        let (mut store, clock) = store_with_clock(10);

        store.put("k", b"v".to_vec(), Some(Duration::from_millis(5)));
        clock.advance(Duration::from_millis(5));

        assert!(!store.delete("k"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_size_purges_expired() {
        let (mut store, clock) = store_with_clock(10);

        store.put("a", b"1".to_vec(), Some(Duration::from_secs(1)));
        store.put("b", b"2".to_vec(), Some(Duration::from_secs(5)));
        store.put("c", b"3".to_vec(), None);
        clock.advance(Duration::from_secs(2));

        assert_eq!(store.len(), 3);
        assert_eq!(store.size(), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_store_stats() {
        let mut store = CacheStore::new(100).unwrap();

        store.put("key1", b"value1".to_vec(), None);
        store.get("key1").unwrap(); // hit
        let _ = store.get("nonexistent"); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let (mut store, clock) = store_with_clock(100);

        store.put("key1", b"value1".to_vec(), Some(Duration::from_secs(1)));
        store.put("key2", b"value2".to_vec(), Some(Duration::from_secs(10)));
        clock.advance(Duration::from_millis(1100));

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("key2").is_ok());
        assert_eq!(store.cleanup_expired(), 0);
    }

    #[test]
    fn test_store_clear() {
        let mut store = CacheStore::new(10).unwrap();
        store.put("a", b"1".to_vec(), Some(Duration::from_secs(1)));
        store.put("b", b"2".to_vec(), None);

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.cleanup_expired(), 0);
        assert_eq!(store.stats().total_entries, 0);
    }
}
