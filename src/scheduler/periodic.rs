//! Periodic Scheduler
//!
//! Runs each registered job in its own task: run, sleep for the interval,
//! repeat until shutdown. A failing or panicking run is logged and recorded,
//! and the loop carries on; other jobs are never affected.
//!
//! Shutdown interrupts the sleep between runs but never an in-flight run.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::future::{join_all, BoxFuture, FutureExt};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::SchedulerError;
use crate::scheduler::{JobBoard, JobStatus, Shutdown};

type WorkFn = Arc<dyn Fn(Shutdown) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

// == Scheduled Job ==
#[derive(Clone)]
struct ScheduledJob {
    name: String,
    interval: Duration,
    work: WorkFn,
}

// == Periodic Scheduler ==
#[derive(Default)]
pub struct PeriodicScheduler {
    jobs: Vec<ScheduledJob>,
    board: JobBoard,
}

impl PeriodicScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `work` to run every `interval`, starting immediately once
    /// the scheduler starts.
    pub fn register_job<F, Fut>(
        &mut self,
        name: impl Into<String>,
        interval: Duration,
        work: F,
    ) -> Result<(), SchedulerError>
    where
        F: Fn(Shutdown) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let name = name.into();
        if interval.is_zero() {
            return Err(SchedulerError::ZeroInterval(name));
        }
        if self.board.contains(&name) {
            return Err(SchedulerError::DuplicateJob(name));
        }

        self.board.insert(JobStatus::new(&name, interval));
        self.jobs.push(ScheduledJob {
            name,
            interval,
            work: Arc::new(move |shutdown| work(shutdown).boxed()),
        });
        Ok(())
    }

    /// Shared view of job statuses, valid before and after `start`.
    pub fn board(&self) -> JobBoard {
        self.board.clone()
    }

    pub fn job_statuses(&self) -> Vec<JobStatus> {
        self.board.snapshot()
    }

    /// Spawns [`run`](Self::run) in the background.
    pub fn start(self, shutdown: Shutdown) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Runs every job loop concurrently; returns once all have observed
    /// shutdown and exited.
    pub async fn run(self, shutdown: Shutdown) {
        info!(jobs = self.jobs.len(), "scheduler started");

        let loops: Vec<JoinHandle<()>> = self
            .jobs
            .into_iter()
            .map(|job| tokio::spawn(job_loop(job, self.board.clone(), shutdown.clone())))
            .collect();

        for result in join_all(loops).await {
            if let Err(e) = result {
                error!(error = %e, "job loop terminated abnormally");
            }
        }

        info!("scheduler stopped");
    }
}

async fn job_loop(job: ScheduledJob, board: JobBoard, shutdown: Shutdown) {
    info!(
        job = %job.name,
        interval_secs = job.interval.as_secs(),
        "job loop started"
    );

    while !shutdown.is_cancelled() {
        board.mark_running(&job.name);
        let started = Instant::now();

        // Own task so a panic stays inside this run.
        let outcome = tokio::spawn((job.work)(shutdown.clone())).await;
        let elapsed = started.elapsed();

        let failure = match outcome {
            Ok(Ok(())) => {
                info!(job = %job.name, elapsed_ms = elapsed.as_millis() as u64, "job completed");
                None
            }
            Ok(Err(e)) => {
                error!(
                    job = %job.name,
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %format!("{:#}", e),
                    "job failed"
                );
                Some(format!("{:#}", e))
            }
            Err(e) => {
                let message = panic_message(e);
                error!(job = %job.name, error = %message, "job panicked");
                Some(message)
            }
        };

        let next_run = Utc::now()
            + chrono::Duration::from_std(job.interval).unwrap_or_else(|_| chrono::Duration::zero());
        board.record_outcome(&job.name, elapsed, failure, next_run);

        tokio::select! {
            _ = tokio::time::sleep(job.interval) => {}
            _ = shutdown.cancelled() => {
                debug!(job = %job.name, "shutdown during sleep");
                break;
            }
        }
    }

    board.mark_stopped(&job.name);
    info!(job = %job.name, "job loop stopped");
}

fn panic_message(err: JoinError) -> String {
    if !err.is_panic() {
        warn!(error = %err, "job task cancelled");
        return err.to_string();
    }

    let panic = err.into_panic();
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{shutdown_channel, JobState};

    #[test]
    fn test_rejects_duplicate_names() {
        let mut scheduler = PeriodicScheduler::new();

        scheduler
            .register_job("cleanup", Duration::from_secs(1), |_| async { anyhow::Ok(()) })
            .unwrap();
        let result =
            scheduler.register_job("cleanup", Duration::from_secs(1), |_| async { anyhow::Ok(()) });

        assert_eq!(result, Err(SchedulerError::DuplicateJob("cleanup".to_string())));
    }

    #[test]
    fn test_rejects_zero_interval() {
        let mut scheduler = PeriodicScheduler::new();

        let result = scheduler.register_job("busy", Duration::ZERO, |_| async { anyhow::Ok(()) });

        assert_eq!(result, Err(SchedulerError::ZeroInterval("busy".to_string())));
        assert!(scheduler.job_statuses().is_empty());
    }

    async fn explode(_shutdown: Shutdown) -> anyhow::Result<()> {
        panic!("kaboom")
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_job_is_recorded_and_rescheduled() {
        let mut scheduler = PeriodicScheduler::new();
        scheduler
            .register_job("explodes", Duration::from_secs(10), explode)
            .unwrap();
        let board = scheduler.board();

        let (trigger, shutdown) = shutdown_channel();
        let handle = scheduler.start(shutdown);

        tokio::time::sleep(Duration::from_secs(25)).await;
        trigger.trigger();
        handle.await.unwrap();

        let status = board.get("explodes").unwrap();
        assert_eq!(status.run_count, 3);
        assert_eq!(status.failure_count, 3);
        assert_eq!(status.state, JobState::Stopped);
        assert!(status.last_error.unwrap().contains("kaboom"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_with_no_jobs_finishes_immediately() {
        let (_trigger, shutdown) = shutdown_channel();
        PeriodicScheduler::new().run(shutdown).await;
    }
}
