//! API Handlers
//!
//! HTTP handlers for the ops endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{CacheCoordinator, MemoryTier};
use crate::error::Result;
use crate::models::{
    HealthResponse, InvalidateRequest, InvalidateResponse, JobsResponse, RemoveResponse,
    StatsResponse,
};
use crate::scheduler::JobBoard;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<CacheCoordinator>,
    /// Fast tier, for occupancy figures
    pub fast_tier: Arc<MemoryTier>,
    pub jobs: JobBoard,
}

impl AppState {
    pub fn new(cache: Arc<CacheCoordinator>, fast_tier: Arc<MemoryTier>, jobs: JobBoard) -> Self {
        Self {
            cache,
            fast_tier,
            jobs,
        }
    }
}

/// Handler for DELETE /cache/:key
pub async fn remove_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<RemoveResponse> {
    state.cache.remove(&key).await;
    Json(RemoveResponse::new(key))
}

/// Handler for POST /cache/invalidate
///
/// Malformed patterns are rejected with 400.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    let removed = state.cache.remove_by_pattern(&req.pattern).await?;
    Ok(Json(InvalidateResponse::new(req.pattern, removed)))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let fast_tier = state.fast_tier.stats().await;
    Json(StatsResponse::new(state.cache.stats(), fast_tier))
}

/// Handler for GET /jobs
pub async fn jobs_handler(State(state): State<AppState>) -> Json<JobsResponse> {
    Json(JobsResponse {
        jobs: state.jobs.snapshot(),
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
