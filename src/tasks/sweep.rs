//! Fast-Tier Sweep
//!
//! Drops expired fast-tier entries so they stop holding byte budget until
//! their next read.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::MemoryTier;
use crate::scheduler::Shutdown;

pub struct TierSweep {
    tier: Arc<MemoryTier>,
}

impl TierSweep {
    pub fn new(tier: Arc<MemoryTier>) -> Self {
        Self { tier }
    }

    pub async fn run(&self, _shutdown: Shutdown) -> anyhow::Result<usize> {
        let removed = self.tier.cleanup_expired().await;

        if removed > 0 {
            info!(removed, "tier sweep removed expired entries");
        } else {
            debug!("tier sweep: no expired entries found");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheTier;
    use crate::scheduler::shutdown_channel;
    use std::time::Duration;
    use tokio_test::assert_ok;

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_only_expired_entries() {
        let tier = Arc::new(MemoryTier::new("fast", 1024));
        tier.set("expire_soon", Arc::new(b"v".to_vec()), Duration::from_secs(1))
            .await
            .unwrap();
        tier.set("long_lived", Arc::new(b"v".to_vec()), Duration::from_secs(3600))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;

        let (_trigger, shutdown) = shutdown_channel();
        let removed = assert_ok!(TierSweep::new(tier.clone()).run(shutdown).await);

        assert_eq!(removed, 1);
        assert_eq!(tier.len().await, 1);
        assert!(tier.contains("long_lived").await.unwrap());
    }
}
