//! Conversions between caller types and the opaque bytes the cache stores.

use crate::error::{CacheError, Result};

/// Types that can be written into the cache.
pub trait IntoCacheValue {
    fn into_cache_value(self) -> Vec<u8>;
}

/// Types that can be read back out of the cache.
pub trait FromCacheValue: Sized {
    fn from_cache_value(bytes: Vec<u8>) -> Result<Self>;
}

impl IntoCacheValue for Vec<u8> {
    fn into_cache_value(self) -> Vec<u8> {
        self
    }
}

impl IntoCacheValue for &[u8] {
    fn into_cache_value(self) -> Vec<u8> {
        self.to_vec()
    }
}

impl IntoCacheValue for String {
    fn into_cache_value(self) -> Vec<u8> {
        self.into_bytes()
    }
}

impl IntoCacheValue for &str {
    fn into_cache_value(self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

// Numbers are stored as decimal text, the way a Redis client would send them.
impl IntoCacheValue for i64 {
    fn into_cache_value(self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl IntoCacheValue for f64 {
    fn into_cache_value(self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl FromCacheValue for Vec<u8> {
    fn from_cache_value(bytes: Vec<u8>) -> Result<Self> {
        Ok(bytes)
    }
}

impl FromCacheValue for String {
    fn from_cache_value(bytes: Vec<u8>) -> Result<Self> {
        String::from_utf8(bytes).map_err(|e| CacheError::Decode(format!("not UTF-8: {}", e)))
    }
}

impl FromCacheValue for i64 {
    fn from_cache_value(bytes: Vec<u8>) -> Result<Self> {
        let text = String::from_cache_value(bytes)?;
        text.trim()
            .parse()
            .map_err(|_| CacheError::Decode(format!("'{}' is not an integer", text)))
    }
}

impl FromCacheValue for f64 {
    fn from_cache_value(bytes: Vec<u8>) -> Result<Self> {
        let text = String::from_cache_value(bytes)?;
        text.trim()
            .parse()
            .map_err(|_| CacheError::Decode(format!("'{}' is not a number", text)))
    }
}
