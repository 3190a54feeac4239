//! Cache Module
//!
//! Two-tier cache: a size-bounded in-process fast tier over a larger remote
//! tier, coordinated with cache-aside population and glob invalidation.

mod coordinator;
mod entry;
mod lru;
mod memory;
mod pattern;
#[cfg(feature = "redis")]
mod redis;
mod registry;
mod stats;
mod tier;

#[cfg(test)]
mod property_tests;

use std::time::Duration;

// Re-export public types
pub use coordinator::{CacheCoordinator, CoordinatorSettings};
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use memory::{MemoryTier, TierStats, TierStore};
pub use pattern::{PatternMatcher, PatternMode};
#[cfg(feature = "redis")]
pub use redis::RedisTier;
pub use registry::KeyRegistry;
pub use stats::{CacheStats, StatsRecorder};
pub use tier::{CacheTier, TierError, TierValue};

// == Public Constants ==
/// Maximum TTL of any fast-tier entry
pub const FAST_TIER_TTL_CEILING: Duration = Duration::from_secs(300);

/// Encoded values at or above this size are kept out of the fast tier
pub const FAST_TIER_MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB

/// Default byte budget of the fast tier
pub const FAST_TIER_MAX_BYTES: usize = 64 * 1024 * 1024;

/// TTL applied when callers don't pass one
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);
