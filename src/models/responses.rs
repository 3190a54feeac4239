//! Response DTOs for the ops API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, TierStats};
use crate::scheduler::JobStatus;

/// Response body for DELETE /cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct RemoveResponse {
    pub message: String,
    pub key: String,
}

impl RemoveResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' removed from all tiers", key),
            key,
        }
    }
}

/// Response body for POST /cache/invalidate
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub pattern: String,
    /// Registered keys that matched and were removed
    pub removed: usize,
}

impl InvalidateResponse {
    pub fn new(pattern: impl Into<String>, removed: usize) -> Self {
        Self {
            pattern: pattern.into(),
            removed,
        }
    }
}

/// Response body for GET /stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Coordinator counters
    pub cache: CacheStats,
    /// Hit rate across both tiers
    pub hit_rate: f64,
    /// Fast tier occupancy and evictions
    pub fast_tier: TierStats,
}

impl StatsResponse {
    pub fn new(cache: CacheStats, fast_tier: TierStats) -> Self {
        Self {
            hit_rate: cache.hit_rate(),
            cache,
            fast_tier,
        }
    }
}

/// Response body for GET /jobs
#[derive(Debug, Clone, Serialize)]
pub struct JobsResponse {
    pub jobs: Vec<JobStatus>,
}

/// Response body for GET /health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_response_serialize() {
        let resp = RemoveResponse::new("report:1");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("report:1"));
        assert!(json.contains("removed"));
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let cache = CacheStats {
            fast_hits: 60,
            remote_hits: 20,
            misses: 20,
            ..CacheStats::default()
        };
        let resp = StatsResponse::new(cache, TierStats::default());
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
