//! Statistics Aggregation Job
//!
//! Computes usage counters from the record store and caches them:
//! - every run: the current day, under `stats:daily:<YYYY-MM-DD>`
//! - during the rollup hour: week and month to date, under
//!   `stats:weekly:<ISO-year>-<ISO-week>` and `stats:monthly:<YYYY-MM>`

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::CacheCoordinator;
use crate::records::{RecordClass, RecordStore};
use crate::scheduler::Shutdown;

const DAILY_TTL: Duration = Duration::from_secs(25 * 60 * 60);
const WEEKLY_TTL: Duration = Duration::from_secs(8 * 24 * 60 * 60);
const MONTHLY_TTL: Duration = Duration::from_secs(32 * 24 * 60 * 60);

pub fn daily_key(date: NaiveDate) -> String {
    format!("stats:daily:{}", date.format("%Y-%m-%d"))
}

pub fn weekly_key(date: NaiveDate) -> String {
    format!("stats:weekly:{}", date.format("%G-%V"))
}

pub fn monthly_key(date: NaiveDate) -> String {
    format!("stats:monthly:{}", date.format("%Y-%m"))
}

// == Usage Stats ==
/// Counters for one period, as cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub period: String,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub reports: u64,
    pub photos: u64,
    pub attendance: u64,
    pub messages: u64,
    /// Distinct users who sent a message
    pub active_users: u64,
    pub generated_at: DateTime<Utc>,
}

pub struct StatsAggregator {
    store: Arc<dyn RecordStore>,
    cache: Arc<CacheCoordinator>,
    rollup_hour: u32,
}

impl StatsAggregator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        cache: Arc<CacheCoordinator>,
        rollup_hour: u32,
    ) -> Self {
        Self {
            store,
            cache,
            rollup_hour,
        }
    }

    pub async fn run(&self, shutdown: Shutdown) -> anyhow::Result<()> {
        if shutdown.is_cancelled() {
            return Ok(());
        }
        self.aggregate_at(Utc::now()).await
    }

    /// Computes and caches the buckets due at `now`.
    pub async fn aggregate_at(&self, now: DateTime<Utc>) -> anyhow::Result<()> {
        let today = now.date_naive();

        let day_start = start_of(today);
        let daily = self
            .collect("daily", day_start, start_of(today + Days::new(1)), now)
            .await?;
        self.cache.set(&daily_key(today), &daily, Some(DAILY_TTL)).await;
        debug!(reports = daily.reports, photos = daily.photos, "daily stats cached");

        if now.hour() != self.rollup_hour {
            return Ok(());
        }

        let week_start = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
        let weekly = self
            .collect("weekly", start_of(week_start), start_of(week_start + Days::new(7)), now)
            .await?;
        self.cache.set(&weekly_key(today), &weekly, Some(WEEKLY_TTL)).await;

        let month_start = today.with_day(1).unwrap_or(today);
        let next_month = month_start + Months::new(1);
        let monthly = self
            .collect("monthly", start_of(month_start), start_of(next_month), now)
            .await?;
        self.cache.set(&monthly_key(today), &monthly, Some(MONTHLY_TTL)).await;

        info!(
            week = %weekly_key(today),
            month = %monthly_key(today),
            "weekly and monthly rollups cached"
        );
        Ok(())
    }

    async fn collect(
        &self,
        period: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<UsageStats> {
        Ok(UsageStats {
            period: period.to_string(),
            from,
            to,
            reports: self.count(RecordClass::Report, from, to).await?,
            photos: self.count(RecordClass::Photo, from, to).await?,
            attendance: self.count(RecordClass::Attendance, from, to).await?,
            messages: self.count(RecordClass::Message, from, to).await?,
            active_users: self
                .store
                .count_distinct_actors(RecordClass::Message, from, to)
                .await
                .with_context(|| format!("counting active users for {} stats", period))?,
            generated_at: now,
        })
    }

    async fn count(
        &self,
        class: RecordClass,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> anyhow::Result<u64> {
        self.store
            .count_between(class, from, to)
            .await
            .with_context(|| format!("counting {:?} records", class))
    }
}

fn start_of(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}
