//! Scheduled clinical checks for GTMS.
//!
//! This crate provides:
//! - The four scans that turn clinical records into alerts and notifications
//! - A task runner that records the last outcome of every check
//! - A cron scheduler that invokes the runner on fixed cadences

pub mod checks;
pub mod runner;
pub mod scheduler;

pub use checks::{CheckError, CheckOutcome, ScheduledCheck, build_runner};
pub use runner::{RunStatus, TaskRunner, TaskStatus};
pub use scheduler::CronScheduler;
