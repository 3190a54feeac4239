//! Cache Coordinator Module
//!
//! Layers a small, short-lived fast tier over a larger remote tier.
//!
//! ```text
//! get ──► fast ──miss──► remote ──hit──► promote into fast (TTL capped)
//! set ──► remote (full TTL) + fast (TTL capped, small values only) + registry
//! ```
//!
//! Tier and serialization failures never reach callers: reads degrade to a
//! miss, writes to a no-op, and both are logged and counted. The only error a
//! caller sees is a failing `get_or_set` factory or a malformed invalidation
//! pattern.
//!
//! No cross-key or per-key locking is performed. Concurrent misses in
//! `get_or_set` may run the factory more than once; the last write to each
//! tier wins.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{
    CacheStats, CacheTier, KeyRegistry, PatternMatcher, PatternMode, StatsRecorder,
    DEFAULT_TTL, FAST_TIER_MAX_VALUE_SIZE, FAST_TIER_TTL_CEILING,
};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Coordinator Settings ==
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    /// Upper bound on any fast-tier TTL
    pub fast_ttl_ceiling: Duration,
    /// Encoded values at or above this size are written to the remote tier only
    pub fast_max_value_size: usize,
    /// TTL used when a caller passes `None`
    pub default_ttl: Duration,
    pub pattern_mode: PatternMode,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            fast_ttl_ceiling: FAST_TIER_TTL_CEILING,
            fast_max_value_size: FAST_TIER_MAX_VALUE_SIZE,
            default_ttl: DEFAULT_TTL,
            pattern_mode: PatternMode::Loose,
        }
    }
}

impl From<&Config> for CoordinatorSettings {
    fn from(config: &Config) -> Self {
        Self {
            fast_ttl_ceiling: config.fast_tier_ttl_ceiling,
            fast_max_value_size: config.fast_tier_max_value_size,
            default_ttl: config.default_ttl,
            pattern_mode: if config.strict_patterns {
                PatternMode::Strict
            } else {
                PatternMode::Loose
            },
        }
    }
}

// == Cache Coordinator ==
pub struct CacheCoordinator {
    fast: Arc<dyn CacheTier>,
    remote: Arc<dyn CacheTier>,
    registry: KeyRegistry,
    stats: StatsRecorder,
    settings: CoordinatorSettings,
}

impl CacheCoordinator {
    pub fn new(
        fast: Arc<dyn CacheTier>,
        remote: Arc<dyn CacheTier>,
        settings: CoordinatorSettings,
    ) -> Self {
        Self {
            fast,
            remote,
            registry: KeyRegistry::new(),
            stats: StatsRecorder::new(),
            settings,
        }
    }

    // == Get ==
    /// Returns the cached value, or `None` on a miss or any internal failure.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.lookup(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "cache read failed, treating as miss");
                self.stats.record_absorbed_error();
                self.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Writes `value` to the remote tier with the full TTL and, when small
    /// enough, to the fast tier with a capped TTL. Failures are logged only.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.settings.default_ttl);

        let data = match serde_json::to_vec(value) {
            Ok(data) => Arc::new(data),
            Err(e) => {
                warn!(key = %key, error = %e, "failed to encode cache value");
                self.stats.record_absorbed_error();
                return;
            }
        };
        let size = data.len();

        if let Err(e) = self.remote.set(key, data.clone(), ttl).await {
            self.absorb(key, CacheError::tier(self.remote.name(), e));
        }

        if size < self.settings.fast_max_value_size {
            if let Err(e) = self.fast.set(key, data, self.fast_ttl(ttl)).await {
                self.absorb(key, CacheError::tier(self.fast.name(), e));
            }
        } else {
            debug!(key = %key, size, "value too large for fast tier");
            self.stats.record_fast_tier_skip();
            // Drop any older, smaller copy so reads don't serve it.
            if let Err(e) = self.fast.remove(key).await {
                self.absorb(key, CacheError::tier(self.fast.name(), e));
            }
        }

        self.registry.add(key, Utc::now());
        self.stats.record_set();
        debug!(key = %key, size, ttl_secs = ttl.as_secs(), "cache set");
    }

    // == Remove ==
    /// Deletes `key` from both tiers and the registry. Absence is not an error.
    pub async fn remove(&self, key: &str) {
        let (fast, remote) = tokio::join!(self.fast.remove(key), self.remote.remove(key));

        if let Err(e) = fast {
            self.absorb(key, CacheError::tier(self.fast.name(), e));
        }
        if let Err(e) = remote {
            self.absorb(key, CacheError::tier(self.remote.name(), e));
        }

        self.registry.remove(key);
        self.stats.record_removal();
    }

    // == Remove By Pattern ==
    /// Removes every registered key matching `glob`, returning how many were
    /// removed.
    ///
    /// The scan runs over a registry snapshot: keys written concurrently may or
    /// may not be included.
    pub async fn remove_by_pattern(&self, glob: &str) -> Result<usize> {
        let matcher = PatternMatcher::compile(glob, self.settings.pattern_mode)?;

        let matched: Vec<String> = self
            .registry
            .snapshot()
            .into_iter()
            .filter(|key| matcher.is_match(key))
            .collect();

        join_all(matched.iter().map(|key| self.remove(key))).await;

        info!(pattern = %matcher.glob(), removed = matched.len(), "pattern invalidation");
        Ok(matched.len())
    }

    // == Get Or Set ==
    /// Cache-aside read: returns the cached value, or produces one with
    /// `factory`, caches it and returns it.
    ///
    /// When the cache itself fails the factory is called without caching.
    /// Factory errors are returned unchanged.
    pub async fn get_or_set<T, F, Fut, E>(
        &self,
        key: &str,
        factory: F,
        ttl: Option<Duration>,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        match self.lookup::<T>(key).await {
            Ok(Some(value)) => Ok(value),
            Ok(None) => {
                let value = factory().await?;
                self.set(key, &value, ttl).await;
                Ok(value)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "cache unavailable, calling factory uncached");
                self.stats.record_absorbed_error();
                factory().await
            }
        }
    }

    // == Exists ==
    /// True if a live copy exists in either tier. The remote tier is only
    /// probed on a fast-tier miss.
    pub async fn exists(&self, key: &str) -> bool {
        match self.fast.contains(key).await {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => self.absorb(key, CacheError::tier(self.fast.name(), e)),
        }

        match self.remote.contains(key).await {
            Ok(found) => found,
            Err(e) => {
                self.absorb(key, CacheError::tier(self.remote.name(), e));
                false
            }
        }
    }

    // == Refresh ==
    /// Moves the remote expiry to `ttl` from now and, if the key is fast-tier
    /// resident, rewrites the fast copy with a capped TTL.
    pub async fn refresh(&self, key: &str, ttl: Duration) {
        match self.remote.expire(key, ttl).await {
            Ok(true) => debug!(key = %key, ttl_secs = ttl.as_secs(), "remote expiry refreshed"),
            Ok(false) => debug!(key = %key, "refresh of key absent from remote tier"),
            Err(e) => self.absorb(key, CacheError::tier(self.remote.name(), e)),
        }

        match self.fast.get(key).await {
            Ok(Some(value)) => {
                if let Err(e) = self.fast.set(key, value.data, self.fast_ttl(ttl)).await {
                    self.absorb(key, CacheError::tier(self.fast.name(), e));
                }
            }
            Ok(None) => {}
            Err(e) => self.absorb(key, CacheError::tier(self.fast.name(), e)),
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.registry.len())
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    /// Two-tier read with promotion.
    ///
    /// A failing tier counts as a miss for that tier; the read only fails when
    /// both tiers fail or a stored value cannot be decoded.
    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let fast_error = match self.fast.get(key).await {
            Ok(Some(value)) => {
                let decoded = serde_json::from_slice(&value.data)?;
                debug!(key = %key, "cache hit (fast)");
                self.stats.record_fast_hit();
                return Ok(Some(decoded));
            }
            Ok(None) => None,
            Err(e) => {
                let err = CacheError::tier(self.fast.name(), e);
                warn!(key = %key, error = %err, "fast tier read failed");
                Some(err)
            }
        };

        let value = match self.remote.get(key).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!(key = %key, "cache miss");
                self.stats.record_miss();
                return Ok(None);
            }
            Err(e) => {
                let err = CacheError::tier(self.remote.name(), e);
                if let Some(fast_err) = fast_error {
                    debug!(key = %key, error = %fast_err, "both tiers failed");
                    return Err(err);
                }
                warn!(key = %key, error = %err, "remote tier read failed");
                self.stats.record_absorbed_error();
                self.stats.record_miss();
                return Ok(None);
            }
        };

        let decoded = serde_json::from_slice(&value.data)?;
        debug!(key = %key, "cache hit (remote)");
        self.stats.record_remote_hit();
        self.promote(key, value.data, value.ttl_remaining).await;
        Ok(Some(decoded))
    }

    async fn promote(&self, key: &str, data: Arc<Vec<u8>>, remaining: Option<Duration>) {
        let ttl = self.fast_ttl(remaining.unwrap_or(self.settings.fast_ttl_ceiling));
        if ttl.is_zero() {
            return;
        }

        match self.fast.set(key, data, ttl).await {
            Ok(()) => {
                debug!(key = %key, ttl_secs = ttl.as_secs(), "promoted to fast tier");
                self.stats.record_promotion();
            }
            Err(e) => self.absorb(key, CacheError::tier(self.fast.name(), e)),
        }
    }

    fn fast_ttl(&self, ttl: Duration) -> Duration {
        ttl.min(self.settings.fast_ttl_ceiling)
    }

    fn absorb(&self, key: &str, err: CacheError) {
        warn!(key = %key, error = %err, "cache operation degraded");
        self.stats.record_absorbed_error();
    }
}
