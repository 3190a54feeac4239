//! Job status board shared between job loops and observers.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Idle,
    Running,
    Stopped,
}

// == Job Status ==
/// Observable state of one scheduled job.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    pub name: String,
    pub interval_secs: u64,
    pub state: JobState,
    /// Completed runs, successful or not
    pub run_count: u64,
    pub failure_count: u64,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
    pub last_duration_ms: Option<u64>,
    pub last_error: Option<String>,
}

impl JobStatus {
    pub fn new(name: &str, interval: Duration) -> Self {
        Self {
            name: name.to_string(),
            interval_secs: interval.as_secs(),
            state: JobState::Idle,
            run_count: 0,
            failure_count: 0,
            last_run: None,
            next_run: None,
            last_duration_ms: None,
            last_error: None,
        }
    }
}

// == Job Board ==
#[derive(Debug, Clone, Default)]
pub struct JobBoard {
    jobs: Arc<DashMap<String, JobStatus>>,
}

impl JobBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, status: JobStatus) {
        self.jobs.insert(status.name.clone(), status);
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.jobs.contains_key(name)
    }

    pub(crate) fn mark_running(&self, name: &str) {
        if let Some(mut status) = self.jobs.get_mut(name) {
            status.state = JobState::Running;
            status.last_run = Some(Utc::now());
        }
    }

    pub(crate) fn record_outcome(
        &self,
        name: &str,
        elapsed: Duration,
        error: Option<String>,
        next_run: DateTime<Utc>,
    ) {
        if let Some(mut status) = self.jobs.get_mut(name) {
            status.state = JobState::Idle;
            status.run_count += 1;
            status.last_duration_ms = Some(elapsed.as_millis() as u64);
            status.next_run = Some(next_run);
            if error.is_some() {
                status.failure_count += 1;
            }
            status.last_error = error;
        }
    }

    pub(crate) fn mark_stopped(&self, name: &str) {
        if let Some(mut status) = self.jobs.get_mut(name) {
            status.state = JobState::Stopped;
            status.next_run = None;
        }
    }

    pub fn get(&self, name: &str) -> Option<JobStatus> {
        self.jobs.get(name).map(|status| status.clone())
    }

    /// All jobs, sorted by name.
    pub fn snapshot(&self) -> Vec<JobStatus> {
        let mut statuses: Vec<JobStatus> =
            self.jobs.iter().map(|entry| entry.value().clone()).collect();
        statuses.sort_by(|a, b| a.name.cmp(&b.name));
        statuses
    }
}
