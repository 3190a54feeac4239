//! Configuration Module
//!
//! Loads cache, scheduler and server settings from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{
    DEFAULT_TTL, FAST_TIER_MAX_BYTES, FAST_TIER_MAX_VALUE_SIZE, FAST_TIER_TTL_CEILING,
};

/// Host process configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Byte budget of the fast tier
    pub fast_tier_max_bytes: usize,
    /// Upper bound on fast-tier TTLs
    pub fast_tier_ttl_ceiling: Duration,
    /// Encoded values at or above this size skip the fast tier
    pub fast_tier_max_value_size: usize,
    /// TTL for writes that don't specify one
    pub default_ttl: Duration,
    /// Escape regex metacharacters in invalidation globs
    pub strict_patterns: bool,
    /// Retention cleanup interval
    pub cleanup_interval: Duration,
    /// Volatile key invalidation interval
    pub cache_optimize_interval: Duration,
    /// Statistics aggregation interval
    pub stats_interval: Duration,
    /// UTC hour during which weekly and monthly rollups are computed
    pub stats_rollup_hour: u32,
    /// Expired fast-tier entry sweep interval
    pub sweep_interval: Duration,
    /// Ops HTTP server port
    pub server_port: u16,
    /// Remote tier URL; in-process remote tier when unset
    pub redis_url: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `FAST_TIER_MAX_BYTES` - fast tier budget in bytes (default: 64 MiB)
    /// - `FAST_TIER_TTL_CEILING` - seconds (default: 300)
    /// - `FAST_TIER_MAX_VALUE_SIZE` - bytes (default: 1 MiB)
    /// - `DEFAULT_TTL` - seconds (default: 3600)
    /// - `STRICT_PATTERNS` - `true`/`false` (default: false)
    /// - `CLEANUP_INTERVAL` - seconds (default: 21600)
    /// - `CACHE_OPTIMIZE_INTERVAL` - seconds (default: 3600)
    /// - `STATS_INTERVAL` - seconds (default: 1800)
    /// - `STATS_ROLLUP_HOUR` - 0-23 (default: 0)
    /// - `SWEEP_INTERVAL` - seconds (default: 60)
    /// - `SERVER_PORT` - ops HTTP port (default: 3000)
    /// - `REDIS_URL` - remote tier URL (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            fast_tier_max_bytes: parse_env("FAST_TIER_MAX_BYTES")
                .unwrap_or(defaults.fast_tier_max_bytes),
            fast_tier_ttl_ceiling: secs_env("FAST_TIER_TTL_CEILING")
                .unwrap_or(defaults.fast_tier_ttl_ceiling),
            fast_tier_max_value_size: parse_env("FAST_TIER_MAX_VALUE_SIZE")
                .unwrap_or(defaults.fast_tier_max_value_size),
            default_ttl: secs_env("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            strict_patterns: parse_env("STRICT_PATTERNS").unwrap_or(defaults.strict_patterns),
            cleanup_interval: secs_env("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            cache_optimize_interval: secs_env("CACHE_OPTIMIZE_INTERVAL")
                .unwrap_or(defaults.cache_optimize_interval),
            stats_interval: secs_env("STATS_INTERVAL").unwrap_or(defaults.stats_interval),
            stats_rollup_hour: parse_env::<u32>("STATS_ROLLUP_HOUR")
                .filter(|hour| *hour < 24)
                .unwrap_or(defaults.stats_rollup_hour),
            sweep_interval: secs_env("SWEEP_INTERVAL").unwrap_or(defaults.sweep_interval),
            server_port: parse_env("SERVER_PORT").unwrap_or(defaults.server_port),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fast_tier_max_bytes: FAST_TIER_MAX_BYTES,
            fast_tier_ttl_ceiling: FAST_TIER_TTL_CEILING,
            fast_tier_max_value_size: FAST_TIER_MAX_VALUE_SIZE,
            default_ttl: DEFAULT_TTL,
            strict_patterns: false,
            cleanup_interval: Duration::from_secs(6 * 60 * 60),
            cache_optimize_interval: Duration::from_secs(60 * 60),
            stats_interval: Duration::from_secs(30 * 60),
            stats_rollup_hour: 0,
            sweep_interval: Duration::from_secs(60),
            server_port: 3000,
            redis_url: None,
        }
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Zero would make a job spin or a TTL meaningless, so it falls back to the default.
fn secs_env(name: &str) -> Option<Duration> {
    parse_env::<u64>(name)
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}
