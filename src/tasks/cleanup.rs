//! Retention Cleanup Job
//!
//! Deletes records past their retention window from the record store, all
//! classes in one transaction per run.

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use tracing::{debug, info};

use crate::records::{RecordClass, RecordStore, RetentionRule};
use crate::scheduler::Shutdown;

/// Retention windows applied on every run.
pub fn default_retention_rules() -> Vec<RetentionRule> {
    vec![
        RetentionRule::new(RecordClass::VerificationCode, Duration::hours(24)),
        RetentionRule::new(RecordClass::SmsLog, Duration::days(90)),
        RetentionRule::new(RecordClass::PushLog, Duration::days(90)),
        RetentionRule::new(RecordClass::AccessLog, Duration::days(180)),
    ]
}

pub struct RetentionCleanup {
    store: Arc<dyn RecordStore>,
    rules: Vec<RetentionRule>,
}

impl RetentionCleanup {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_rules(store, default_retention_rules())
    }

    pub fn with_rules(store: Arc<dyn RecordStore>, rules: Vec<RetentionRule>) -> Self {
        Self { store, rules }
    }

    /// Purges expired records, returning the aggregate deleted count.
    pub async fn run(&self, shutdown: Shutdown) -> anyhow::Result<u64> {
        if shutdown.is_cancelled() {
            return Ok(0);
        }

        let deleted = self
            .store
            .purge(&self.rules, Utc::now())
            .await
            .context("retention purge failed")?;

        if deleted > 0 {
            info!(deleted, "retention cleanup removed expired records");
        } else {
            debug!("retention cleanup: nothing to delete");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::records::InMemoryRecordStore;
    use crate::scheduler::shutdown_channel;
    use async_trait::async_trait;
    use chrono::DateTime;

    #[tokio::test]
    async fn test_cleanup_reports_aggregate_count() {
        let store = Arc::new(InMemoryRecordStore::new());
        let now = Utc::now();
        store.insert(RecordClass::VerificationCode, 1, now - Duration::hours(30)).await;
        store.insert(RecordClass::PushLog, 1, now - Duration::days(91)).await;
        store.insert(RecordClass::AccessLog, 1, now - Duration::days(181)).await;
        store.insert(RecordClass::AccessLog, 1, now - Duration::days(10)).await;

        let (_trigger, shutdown) = shutdown_channel();
        let deleted = RetentionCleanup::new(store.clone()).run(shutdown).await.unwrap();

        assert_eq!(deleted, 3);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_cleanup_skips_when_cancelled() {
        let store = Arc::new(InMemoryRecordStore::new());
        store
            .insert(RecordClass::VerificationCode, 1, Utc::now() - Duration::days(2))
            .await;

        let (trigger, shutdown) = shutdown_channel();
        trigger.trigger();
        let deleted = RetentionCleanup::new(store.clone()).run(shutdown).await.unwrap();

        assert_eq!(deleted, 0);
        assert_eq!(store.len().await, 1);
    }

    struct BrokenStore;

    #[async_trait]
    impl RecordStore for BrokenStore {
        async fn purge(&self, _: &[RetentionRule], _: DateTime<Utc>) -> Result<u64, StoreError> {
            Err(StoreError::Transaction("deadlock detected".into()))
        }

        async fn count_between(
            &self,
            _: RecordClass,
            _: DateTime<Utc>,
            _: DateTime<Utc>,
        ) -> Result<u64, StoreError> {
            Ok(0)
        }

        async fn count_distinct_actors(
            &self,
            _: RecordClass,
            _: DateTime<Utc>,
            _: DateTime<Utc>,
        ) -> Result<u64, StoreError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_cleanup_surfaces_store_error() {
        let (_trigger, shutdown) = shutdown_channel();
        let err = RetentionCleanup::new(Arc::new(BrokenStore))
            .run(shutdown)
            .await
            .unwrap_err();

        assert!(format!("{:#}", err).contains("deadlock detected"));
    }
}
