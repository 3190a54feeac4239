//! Record Store Interface
//!
//! Narrow view of the persistent domain store used by the maintenance jobs.
//! Production hosts implement [`RecordStore`] over their database;
//! [`InMemoryRecordStore`] backs tests and the demo host.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::sync::RwLock;

use crate::error::StoreError;

/// Entity classes the maintenance jobs read or purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordClass {
    VerificationCode,
    SmsLog,
    PushLog,
    AccessLog,
    Report,
    Photo,
    Attendance,
    Message,
}

/// Records of `class` older than `max_age` are deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionRule {
    pub class: RecordClass,
    pub max_age: Duration,
}

impl RetentionRule {
    pub fn new(class: RecordClass, max_age: Duration) -> Self {
        Self { class, max_age }
    }

    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.max_age
    }
}

// == Record Store Trait ==
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Applies every rule in a single transaction, returning the total number
    /// of deleted records.
    async fn purge(&self, rules: &[RetentionRule], now: DateTime<Utc>) -> Result<u64, StoreError>;

    /// Records of `class` created in `[from, to)`.
    async fn count_between(
        &self,
        class: RecordClass,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    /// Distinct actors with a record of `class` in `[from, to)`.
    async fn count_distinct_actors(
        &self,
        class: RecordClass,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, StoreError>;
}

// == In-Memory Store ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub class: RecordClass,
    pub actor_id: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<Vec<Record>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, class: RecordClass, actor_id: u64, created_at: DateTime<Utc>) {
        self.records.write().await.push(Record {
            class,
            actor_id,
            created_at,
        });
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn count_class(&self, class: RecordClass) -> usize {
        self.records
            .read()
            .await
            .iter()
            .filter(|record| record.class == class)
            .count()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn purge(&self, rules: &[RetentionRule], now: DateTime<Utc>) -> Result<u64, StoreError> {
        // One write guard for all rules: readers see either none or all deletions.
        let mut records = self.records.write().await;
        let before = records.len();

        records.retain(|record| {
            !rules
                .iter()
                .any(|rule| rule.class == record.class && record.created_at < rule.cutoff(now))
        });

        Ok((before - records.len()) as u64)
    }

    async fn count_between(
        &self,
        class: RecordClass,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| r.class == class && r.created_at >= from && r.created_at < to)
            .count() as u64)
    }

    async fn count_distinct_actors(
        &self,
        class: RecordClass,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let records = self.records.read().await;
        let actors: HashSet<u64> = records
            .iter()
            .filter(|r| r.class == class && r.created_at >= from && r.created_at < to)
            .map(|r| r.actor_id)
            .collect();
        Ok(actors.len() as u64)
    }
}
