//! Redis remote tier.
//!
//! Pooled connections via `deadpool-redis`. Every connection or command
//! failure is reported as [`TierError::Unavailable`] so the coordinator can
//! degrade the tier instead of failing the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::redis::AsyncCommands;
use deadpool_redis::{Config, Connection, Pool, Runtime};

use crate::cache::tier::{CacheTier, TierError, TierValue};

pub struct RedisTier {
    pool: Pool,
}

impl RedisTier {
    /// Builds a pool for `url`. No connection is opened until first use.
    pub fn connect(url: &str) -> Result<Self, TierError> {
        let pool = Config::from_url(url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| TierError::Unavailable(format!("failed to create redis pool: {}", e)))?;
        Ok(Self { pool })
    }

    async fn conn(&self) -> Result<Connection, TierError> {
        self.pool
            .get()
            .await
            .map_err(|e| TierError::Unavailable(format!("redis connection: {}", e)))
    }
}

fn unavailable(op: &str, err: impl std::fmt::Display) -> TierError {
    TierError::Unavailable(format!("redis {}: {}", op, err))
}

/// TTL in whole milliseconds, clamped to `1..=i64::MAX`.
fn millis(ttl: Duration) -> u64 {
    // PSETEX rejects a zero expiry; PEXPIRE deletes on a negative one.
    u64::try_from(ttl.as_millis())
        .unwrap_or(u64::MAX)
        .clamp(1, i64::MAX as u64)
}

#[async_trait]
impl CacheTier for RedisTier {
    fn name(&self) -> &str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<TierValue>, TierError> {
        let mut conn = self.conn().await?;

        let data: Option<Vec<u8>> = conn.get(key).await.map_err(|e| unavailable("GET", e))?;
        let Some(data) = data else {
            return Ok(None);
        };

        // PTTL: -1 = no expiry, -2 = key vanished between the two calls.
        let pttl: i64 = conn.pttl(key).await.map_err(|e| unavailable("PTTL", e))?;
        let ttl_remaining = match pttl {
            -2 => return Ok(None),
            ms if ms >= 0 => Some(Duration::from_millis(ms as u64)),
            _ => None,
        };

        Ok(Some(TierValue {
            data: Arc::new(data),
            ttl_remaining,
        }))
    }

    async fn set(&self, key: &str, data: Arc<Vec<u8>>, ttl: Duration) -> Result<(), TierError> {
        let mut conn = self.conn().await?;
        conn.pset_ex::<_, _, ()>(key, data.as_slice(), millis(ttl))
            .await
            .map_err(|e| unavailable("PSETEX", e))
    }

    async fn remove(&self, key: &str) -> Result<(), TierError> {
        let mut conn = self.conn().await?;
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| unavailable("DEL", e))
    }

    async fn contains(&self, key: &str) -> Result<bool, TierError> {
        let mut conn = self.conn().await?;
        conn.exists(key).await.map_err(|e| unavailable("EXISTS", e))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, TierError> {
        let mut conn = self.conn().await?;
        conn.pexpire(key, millis(ttl) as i64)
            .await
            .map_err(|e| unavailable("PEXPIRE", e))
    }
}
