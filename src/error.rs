//! Error types for the cache coordinator, scheduler and record store
//!
//! Cache-internal failures are absorbed by the coordinator and only surface
//! through logs and counters; `PatternSyntax` is the one cache error returned
//! to callers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::cache::TierError;

// == Cache Error Enum ==
#[derive(Error, Debug)]
pub enum CacheError {
    /// Value could not be encoded or decoded
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A tier call failed
    #[error("Tier {tier} unavailable: {reason}")]
    TierUnavailable { tier: String, reason: String },

    /// Invalidation glob could not be compiled
    #[error("Invalid pattern '{pattern}': {reason}")]
    PatternSyntax { pattern: String, reason: String },
}

impl CacheError {
    pub fn tier(tier: &str, err: TierError) -> Self {
        CacheError::TierUnavailable {
            tier: tier.to_string(),
            reason: err.to_string(),
        }
    }
}

// == Scheduler Error ==
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Job already registered: {0}")]
    DuplicateJob(String),

    #[error("Job {0} has a zero interval")]
    ZeroInterval(String),
}

// == Store Error ==
/// Failure reported by the external record store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record store unavailable: {0}")]
    Unavailable(String),

    #[error("Transaction aborted: {0}")]
    Transaction(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::PatternSyntax { .. } => StatusCode::BAD_REQUEST,
            CacheError::Serialization(_) | CacheError::TierUnavailable { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_error_is_bad_request() {
        let err = CacheError::PatternSyntax {
            pattern: "a(".to_string(),
            reason: "unclosed group".to_string(),
        };
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_tier_error_message() {
        let err = CacheError::tier("remote", TierError::Unavailable("connection refused".into()));
        assert_eq!(
            err.to_string(),
            "Tier remote unavailable: tier unavailable: connection refused"
        );
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
