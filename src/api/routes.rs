//! API Routes
//!
//! Configures the Axum router with the ops endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    health_handler, invalidate_handler, jobs_handler, remove_handler, stats_handler, AppState,
};

/// Creates the ops router.
///
/// # Endpoints
/// - `GET /health` - Liveness check
/// - `GET /stats` - Cache counters and fast tier occupancy
/// - `GET /jobs` - Scheduled job statuses
/// - `DELETE /cache/:key` - Remove one key from both tiers
/// - `POST /cache/invalidate` - Remove every key matching a glob
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/jobs", get(jobs_handler))
        .route("/cache/invalidate", post(invalidate_handler))
        .route("/cache/:key", delete(remove_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
