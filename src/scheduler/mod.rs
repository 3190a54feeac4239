//! Scheduler Module
//!
//! Periodic background jobs with per-job fault isolation and cooperative
//! shutdown.

mod periodic;
mod shutdown;
mod status;

pub use periodic::PeriodicScheduler;
pub use shutdown::{shutdown_channel, Shutdown, ShutdownTrigger};
pub use status::{JobBoard, JobState, JobStatus};
