//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod clock;
mod entry;
mod lru;
mod shared;
mod stats;
mod store;
pub mod value;


// Re-export public types
pub use clock::{
    current_timestamp_nanos, duration_to_ms_ceil, duration_to_nanos, Clock, ManualClock,
    SystemClock,
};
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use shared::SharedCache;
pub use stats::CacheStats;
pub use store::CacheStore;
pub use value::{FromCacheValue, IntoCacheValue};

// == Public Constants ==
/// Maximum key length in bytes accepted over HTTP
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum value size in bytes accepted over HTTP
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
