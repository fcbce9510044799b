//! API Handlers
//!
//! HTTP request handlers for each cache service endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::backend::{self, CacheBackend, LocalBackend};
use crate::cache::SharedCache;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::history::CallHistory;
use crate::models::{
    DeleteResponse, GetResponse, HealthResponse, HistoryResponse, SetRequest, SetResponse,
    SizeResponse, StatsResponse, StoreRequest, StoreResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Store the service fronts
    pub backend: Arc<dyn CacheBackend>,
    /// Calls made through the API
    pub history: Arc<CallHistory>,
    /// TTL for writes that carry none
    pub default_ttl: Option<Duration>,
}

impl AppState {
    /// Creates a new AppState over the given backend, with no default TTL.
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            history: Arc::new(CallHistory::default()),
            default_ttl: None,
        }
    }

    /// AppState over an in-process cache.
    pub fn local(cache: SharedCache) -> Self {
        Self::new(Arc::new(LocalBackend::new(cache)))
    }

    pub fn with_default_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Creates a new AppState from configuration.
    ///
    /// Also returns the in-process cache handle when the memory backend is
    /// selected, so the owner can sweep and close it.
    pub fn from_config(config: &Config) -> Result<(Self, Option<SharedCache>)> {
        let (backend, cache) = backend::from_config(config)?;
        let state = Self {
            backend,
            history: Arc::new(CallHistory::new(config.history_limit)),
            default_ttl: config.default_ttl_duration(),
        };
        Ok((state, cache))
    }

    fn effective_ttl(&self, requested: Option<Duration>) -> Option<Duration> {
        requested.or(self.default_ttl)
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair with optional TTL (seconds).
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = state.effective_ttl(req.ttl_duration());
    let input = format!("{}, {}", req.key, req.value);
    state
        .backend
        .set(&req.key, req.value.into_bytes(), ttl)
        .await?;
    state.history.record("set", input, "OK");

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for POST /store
///
/// Stores a value under a generated key and returns the key.
pub async fn store_handler(
    State(state): State<AppState>,
    Json(req): Json<StoreRequest>,
) -> Result<Json<StoreResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl = state.effective_ttl(req.ttl_duration());
    let key = state
        .backend
        .store(req.value.clone().into_bytes(), ttl)
        .await?;
    state.history.record("store", req.value, key.clone());

    Ok(Json(StoreResponse { key }))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.backend.get(&key).await {
        Ok(value) => {
            let response = GetResponse::new(key.clone(), &value);
            state.history.record("get", key, response.value.clone());
            Ok(Json(response))
        }
        Err(err @ CacheError::NotFound(_)) => {
            state.history.record("get", key, "(nil)");
            Err(err)
        }
        Err(err) => Err(err),
    }
}

/// Handler for DELETE /del/:key
///
/// Idempotent: deleting an absent key answers 200 with `deleted: false`.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let deleted = state.backend.delete(&key).await?;
    state.history.record("delete", key.clone(), deleted.to_string());

    Ok(Json(DeleteResponse { key, deleted }))
}

/// Handler for GET /size
pub async fn size_handler(State(state): State<AppState>) -> Result<Json<SizeResponse>> {
    let size = state.backend.size().await?;
    Ok(Json(SizeResponse { size }))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.backend.stats().await?;
    Ok(Json(StatsResponse::from(stats)))
}

/// Handler for GET /history/:method
pub async fn history_handler(
    State(state): State<AppState>,
    Path(method): Path<String>,
) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        calls: state.history.count(&method),
        records: state.history.records(&method),
        replay: state.history.replay(&method),
        method,
    })
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.backend.name()))
}
