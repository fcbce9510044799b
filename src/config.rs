//! Configuration Module
//!
//! Handles loading and validating configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Which store the service fronts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// In-process cache engine
    Memory,
    /// Remote Redis server
    Redis,
}

impl FromStr for BackendKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" | "local" => Ok(BackendKind::Memory),
            "redis" => Ok(BackendKind::Redis),
            other => Err(CacheError::InvalidConfig(format!(
                "unknown backend '{}', expected 'memory' or 'redis'",
                other
            ))),
        }
    }
}

/// Connection parameters for the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub db: i64,
}

impl RedisConfig {
    /// Connection URL understood by `redis::Client::open`.
    pub fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            db: 0,
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Store fronted by the HTTP service
    pub backend: BackendKind,
    /// Maximum number of live entries in the in-process cache
    pub max_entries: usize,
    /// TTL in seconds applied to HTTP writes that carry none; None = never expire
    pub default_ttl: Option<u64>,
    /// HTTP server port
    pub server_port: u16,
    /// Background sweep interval in seconds, 0 disables the sweeper
    pub cleanup_interval: u64,
    /// Remote store connection
    pub redis: RedisConfig,
    /// Records retained per method in the call history
    pub history_limit: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_BACKEND` - `memory` or `redis` (default: memory)
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: unset, 0 also means unset)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 1)
    /// - `REDIS_HOST` / `REDIS_PORT` / `REDIS_DB` - Remote store (default: 127.0.0.1:6379/0)
    /// - `HISTORY_LIMIT` - Call records kept per method (default: 100)
    ///
    /// Unparseable numeric values fall back to their defaults; an unknown
    /// backend name is an error.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let backend = match env::var("CACHE_BACKEND") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.backend,
        };

        Ok(Self {
            backend,
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            default_ttl: parse_var::<u64>("DEFAULT_TTL").filter(|ttl| *ttl > 0),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            redis: RedisConfig {
                host: env::var("REDIS_HOST").unwrap_or(defaults.redis.host),
                port: parse_var("REDIS_PORT").unwrap_or(defaults.redis.port),
                db: parse_var("REDIS_DB").unwrap_or(defaults.redis.db),
            },
            history_limit: parse_var("HISTORY_LIMIT").unwrap_or(defaults.history_limit),
        })
    }

    /// Rejects values no cache can be built from.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(CacheError::InvalidConfig(
                "MAX_ENTRIES must be greater than zero".to_string(),
            ));
        }
        if self.backend == BackendKind::Redis {
            if self.redis.host.trim().is_empty() {
                return Err(CacheError::InvalidConfig(
                    "REDIS_HOST must not be empty".to_string(),
                ));
            }
            if self.redis.port == 0 {
                return Err(CacheError::InvalidConfig(
                    "REDIS_PORT must be greater than zero".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Sweep interval, or None when the sweeper is disabled.
    pub fn cleanup_period(&self) -> Option<Duration> {
        (self.cleanup_interval > 0).then(|| Duration::from_secs(self.cleanup_interval))
    }

    /// Default TTL as a Duration.
    pub fn default_ttl_duration(&self) -> Option<Duration> {
        self.default_ttl.map(Duration::from_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            max_entries: 1000,
            default_ttl: None,
            server_port: 3000,
            cleanup_interval: 1,
            redis: RedisConfig::default(),
            history_limit: 100,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
