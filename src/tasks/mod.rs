//! Maintenance Jobs Module
//!
//! Units of periodic work registered into the scheduler.
//!
//! # Jobs
//! - `retention-cleanup`: purges expired records from the record store
//! - `cache-optimize`: invalidates volatile cache key families
//! - `stats-aggregate`: caches daily, weekly and monthly usage counters
//! - `tier-sweep`: drops expired fast-tier entries

mod cleanup;
mod optimize;
mod stats;
mod sweep;

use std::sync::Arc;

pub use cleanup::{default_retention_rules, RetentionCleanup};
pub use optimize::{CacheOptimizer, VOLATILE_PATTERNS};
pub use stats::{daily_key, monthly_key, weekly_key, StatsAggregator, UsageStats};
pub use sweep::TierSweep;

use crate::cache::{CacheCoordinator, MemoryTier};
use crate::config::Config;
use crate::error::SchedulerError;
use crate::records::RecordStore;
use crate::scheduler::PeriodicScheduler;

/// Registers every maintenance job with the intervals from `config`.
pub fn register_maintenance_jobs(
    scheduler: &mut PeriodicScheduler,
    config: &Config,
    cache: Arc<CacheCoordinator>,
    store: Arc<dyn RecordStore>,
    fast_tier: Arc<MemoryTier>,
) -> Result<(), SchedulerError> {
    let cleanup = Arc::new(RetentionCleanup::new(store.clone()));
    scheduler.register_job("retention-cleanup", config.cleanup_interval, move |shutdown| {
        let job = cleanup.clone();
        async move { job.run(shutdown).await.map(|_| ()) }
    })?;

    let optimizer = Arc::new(CacheOptimizer::new(cache.clone()));
    scheduler.register_job("cache-optimize", config.cache_optimize_interval, move |shutdown| {
        let job = optimizer.clone();
        async move { job.run(shutdown).await.map(|_| ()) }
    })?;

    let aggregator = Arc::new(StatsAggregator::new(store, cache, config.stats_rollup_hour));
    scheduler.register_job("stats-aggregate", config.stats_interval, move |shutdown| {
        let job = aggregator.clone();
        async move { job.run(shutdown).await }
    })?;

    let sweep = Arc::new(TierSweep::new(fast_tier));
    scheduler.register_job("tier-sweep", config.sweep_interval, move |shutdown| {
        let job = sweep.clone();
        async move { job.run(shutdown).await.map(|_| ()) }
    })?;

    Ok(())
}
