//! Cache Statistics Module
//!
//! Lock-free counters recorded by the coordinator, and the snapshot served to
//! the ops API.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Stats Recorder ==
/// Live counters, updated concurrently by coordinator calls.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    fast_hits: AtomicU64,
    remote_hits: AtomicU64,
    misses: AtomicU64,
    promotions: AtomicU64,
    sets: AtomicU64,
    fast_tier_skips: AtomicU64,
    removals: AtomicU64,
    absorbed_errors: AtomicU64,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_fast_hit(&self) {
        self.fast_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_remote_hit(&self) {
        self.remote_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_promotion(&self) {
        self.promotions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_set(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    /// A value too large for the fast tier went to the remote tier only.
    pub fn record_fast_tier_skip(&self) {
        self.fast_tier_skips.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_removal(&self) {
        self.removals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_absorbed_error(&self) {
        self.absorbed_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self, registered_keys: usize) -> CacheStats {
        CacheStats {
            fast_hits: self.fast_hits.load(Ordering::Relaxed),
            remote_hits: self.remote_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            promotions: self.promotions.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            fast_tier_skips: self.fast_tier_skips.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            absorbed_errors: self.absorbed_errors.load(Ordering::Relaxed),
            registered_keys,
        }
    }
}

// == Cache Stats ==
/// Snapshot of coordinator counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub fast_hits: u64,
    pub remote_hits: u64,
    pub misses: u64,
    pub promotions: u64,
    pub sets: u64,
    pub fast_tier_skips: u64,
    pub removals: u64,
    /// Tier and serialization failures swallowed by the coordinator
    pub absorbed_errors: u64,
    /// Current size of the key registry
    pub registered_keys: usize,
}

impl CacheStats {
    pub fn hits(&self) -> u64 {
        self.fast_hits + self.remote_hits
    }

    // == Hit Rate ==
    /// hits / (hits + misses), or 0.0 when nothing was read yet.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits() + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }
}
