//! Request DTOs for the ops API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for POST /cache/invalidate
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    /// Glob over cache keys; `*` matches any run of characters
    pub pattern: String,
}
