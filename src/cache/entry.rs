//! Cache Entry Module
//!
//! Defines a single tier-resident entry: encoded bytes plus an absolute expiry.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// Encoded value held by one tier.
///
/// The same logical key may have independent entries in the fast and remote
/// tiers with different expiries.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Encoded value, shared so hits don't copy the payload
    pub data: Arc<Vec<u8>>,
    /// Insertion instant
    pub created_at: Instant,
    /// Absolute expiry
    pub expires_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` from now.
    pub fn new(data: Arc<Vec<u8>>, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            data,
            created_at: now,
            expires_at: expiry_after(now, ttl),
        }
    }

    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    // == Is Expired ==
    /// An entry is expired once the current instant reaches its expiry.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    // == Time To Live ==
    /// Remaining lifetime, zero when expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Moves the expiry to `ttl` from now.
    pub fn extend(&mut self, ttl: Duration) {
        self.expires_at = expiry_after(Instant::now(), ttl);
    }
}

/// Expiry used when `now + ttl` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

fn expiry_after(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl).unwrap_or_else(|| now + FAR_FUTURE)
}
