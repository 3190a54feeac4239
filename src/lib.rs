//! tiercache - tiered cache coordinator and periodic maintenance scheduler
//!
//! A size-bounded fast tier layered over a larger remote tier, with
//! cache-aside population and glob invalidation, plus a scheduler that runs
//! independent maintenance jobs against the cache and a record store.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod records;
pub mod scheduler;
pub mod tasks;

pub use api::AppState;
pub use cache::CacheCoordinator;
pub use config::Config;
pub use scheduler::{shutdown_channel, PeriodicScheduler, Shutdown, ShutdownTrigger};
pub use tasks::register_maintenance_jobs;
