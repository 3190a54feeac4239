//! Cache Optimization Job
//!
//! Invalidates volatile key families so they cannot accumulate in the cache.
//! Daily statistics buckets are included; the statistics job rewrites the
//! current day's bucket on its next run, so today's bucket can be missing for
//! up to `STATS_INTERVAL` after an optimization pass.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::cache::CacheCoordinator;
use crate::scheduler::Shutdown;

pub const VOLATILE_PATTERNS: &[&str] = &["temp:*", "search:*", "stats:daily:*"];

pub struct CacheOptimizer {
    cache: Arc<CacheCoordinator>,
    patterns: Vec<String>,
}

impl CacheOptimizer {
    pub fn new(cache: Arc<CacheCoordinator>) -> Self {
        Self {
            cache,
            patterns: VOLATILE_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Removes every key matching a volatile pattern; returns the total.
    pub async fn run(&self, shutdown: Shutdown) -> anyhow::Result<usize> {
        let mut removed = 0;
        for pattern in &self.patterns {
            if shutdown.is_cancelled() {
                break;
            }
            removed += self
                .cache
                .remove_by_pattern(pattern)
                .await
                .with_context(|| format!("invalidating {}", pattern))?;
        }

        info!(removed, patterns = self.patterns.len(), "cache optimization finished");
        Ok(removed)
    }
}
