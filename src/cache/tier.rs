//! Cache Tier Abstraction
//!
//! Both the fast (local) and remote (persistent) tiers implement [`CacheTier`].
//! Tiers store opaque encoded bytes; serialization is the coordinator's job.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

// == Tier Value ==
/// A value read from a tier together with its remaining lifetime.
#[derive(Debug, Clone)]
pub struct TierValue {
    pub data: Arc<Vec<u8>>,
    /// `None` when the tier cannot report a remaining TTL
    pub ttl_remaining: Option<Duration>,
}

// == Tier Error ==
/// Failure of a single tier call.
#[derive(Error, Debug)]
pub enum TierError {
    /// Network or storage failure
    #[error("tier unavailable: {0}")]
    Unavailable(String),

    /// The tier refused the entry
    #[error("entry rejected: {0}")]
    Rejected(String),
}

// == Cache Tier Trait ==
/// One cache backend. Implementations provide their own concurrency control.
#[async_trait]
pub trait CacheTier: Send + Sync {
    /// Short name used in logs ("fast", "remote", ...).
    fn name(&self) -> &str;

    /// Reads a live entry. Expired entries are reported as `None`.
    async fn get(&self, key: &str) -> Result<Option<TierValue>, TierError>;

    /// Writes an entry, replacing any previous value and expiry.
    async fn set(&self, key: &str, data: Arc<Vec<u8>>, ttl: Duration) -> Result<(), TierError>;

    /// Deletes an entry. Absence is not an error.
    async fn remove(&self, key: &str) -> Result<(), TierError>;

    /// True if a live entry exists.
    async fn contains(&self, key: &str) -> Result<bool, TierError>;

    /// Moves the expiry of a live entry to `ttl` from now. Returns false if
    /// the key was absent.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, TierError>;
}
