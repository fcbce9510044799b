//! Cache Layer - a bounded in-process cache with TTL expiration and LRU eviction
//!
//! The engine lives in [`cache`]; [`backend`] puts it and a remote Redis
//! server behind one interface, and [`api`] serves either over HTTP.

pub mod api;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod history;
pub mod keygen;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use backend::CacheBackend;
pub use cache::SharedCache;
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
