//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use crate::cache::clock::duration_to_nanos;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// All timestamps are nanoseconds read from the store's clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// The stored value
    pub value: Vec<u8>,
    /// Insertion or last refresh time
    pub created_at: u64,
    /// Expiration time, None = no expiration
    pub expires_at: Option<u64>,
    /// Last successful read (or write)
    pub last_accessed_at: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry written at `now` with optional TTL.
    pub fn new(value: Vec<u8>, ttl: Option<Duration>, now: u64) -> Self {
        let expires_at = ttl.map(|ttl| now.saturating_add(duration_to_nanos(ttl)));

        Self {
            value,
            created_at: now,
            expires_at,
            last_accessed_at: now,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is expired once `now >= expires_at`, so a zero TTL expires
    /// immediately.
    pub fn is_expired_at(&self, now: u64) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    /// Records a successful read.
    pub fn touch(&mut self, now: u64) {
        self.last_accessed_at = now;
    }

    // == Time To Live ==
    /// Returns remaining TTL, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if the entry has TTL and hasn't expired
    /// - `None` if the entry has no TTL (never expires)
    pub fn ttl_remaining(&self, now: u64) -> Option<Duration> {
        self.expires_at
            .map(|expires| Duration::from_nanos(expires.saturating_sub(now)))
    }
}
