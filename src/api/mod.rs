//! API Module
//!
//! HTTP handlers and routing for the ops endpoints of the host process.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Cache statistics
//! - `GET /jobs` - Scheduler job statuses
//! - `DELETE /cache/:key` - Remove a key
//! - `POST /cache/invalidate` - Pattern invalidation

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
