//! Task runner: executes named checks and keeps their last status.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use dashmap::DashMap;
use futures::FutureExt;
use serde::Serialize;

use gtms_core::error::AppError;
use gtms_core::result::AppResult;

use crate::checks::{CheckOutcome, ScheduledCheck};

/// How a single invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every row was processed.
    Succeeded,
    /// The scan finished but some rows failed.
    Partial,
    /// The scan aborted.
    Failed,
    /// A previous invocation was still running.
    Skipped,
}

/// Outcome of the most recent invocation of a task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskStatus {
    pub task: &'static str,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub status: RunStatus,
    pub scanned: u32,
    pub created: u32,
    pub failures: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A registered task and its last status, as listed to operators.
#[derive(Debug, Clone, Serialize)]
pub struct TaskInfo {
    pub name: &'static str,
    pub cron: String,
    pub last_run: Option<TaskStatus>,
}

#[derive(Debug)]
struct RegisteredTask {
    check: Arc<dyn ScheduledCheck>,
    cron: String,
}

/// Runs registered checks by name.
///
/// At most one invocation of a given task runs at a time; a second
/// request while one is in flight is recorded as [`RunStatus::Skipped`].
#[derive(Debug)]
pub struct TaskRunner {
    offset: FixedOffset,
    tasks: Vec<RegisteredTask>,
    running: DashMap<&'static str, ()>,
    statuses: DashMap<&'static str, TaskStatus>,
}

/// Clears the in-flight marker when the invocation ends, even on panic.
struct RunningGuard<'a> {
    running: &'a DashMap<&'static str, ()>,
    name: &'static str,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.running.remove(self.name);
    }
}

impl TaskRunner {
    /// Creates a new runner evaluating "now" in `offset`.
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            offset,
            tasks: Vec::new(),
            running: DashMap::new(),
            statuses: DashMap::new(),
        }
    }

    /// Add a check with its cron cadence.
    pub fn register(&mut self, check: Arc<dyn ScheduledCheck>, cron: &str) {
        self.tasks.push(RegisteredTask {
            check,
            cron: cron.to_string(),
        });
    }

    /// The offset used for local time.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// `(name, cron)` for every registered task, in registration order.
    pub fn schedule(&self) -> Vec<(&'static str, String)> {
        self.tasks
            .iter()
            .map(|t| (t.check.name(), t.cron.clone()))
            .collect()
    }

    /// Registered tasks with their last recorded status.
    pub fn tasks(&self) -> Vec<TaskInfo> {
        self.tasks
            .iter()
            .map(|t| {
                let name = t.check.name();
                TaskInfo {
                    name,
                    cron: t.cron.clone(),
                    last_run: self.statuses.get(name).map(|s| s.clone()),
                }
            })
            .collect()
    }

    /// Last status of every task that has run at least once.
    pub fn statuses(&self) -> Vec<TaskStatus> {
        self.statuses.iter().map(|e| e.value().clone()).collect()
    }

    /// Run `name` now, in local time.
    pub async fn run(&self, name: &str) -> AppResult<TaskStatus> {
        let now = Utc::now().with_timezone(&self.offset).naive_local();
        self.run_at(name, now).await
    }

    /// Run `name` as though the local clock reads `now`.
    pub async fn run_at(&self, name: &str, now: NaiveDateTime) -> AppResult<TaskStatus> {
        let task = self
            .tasks
            .iter()
            .find(|t| t.check.name() == name)
            .ok_or_else(|| {
                AppError::not_found(format!("Unknown task '{name}'")).with_code("TASK_NOT_FOUND")
            })?;
        let name = task.check.name();
        let started_at = Utc::now();

        if self.running.insert(name, ()).is_some() {
            tracing::warn!(task = name, "Previous run still in progress, skipping");
            let status = TaskStatus {
                task: name,
                started_at,
                finished_at: started_at,
                status: RunStatus::Skipped,
                scanned: 0,
                created: 0,
                failures: 0,
                error: None,
            };
            self.statuses.insert(name, status.clone());
            return Ok(status);
        }
        let _guard = RunningGuard {
            running: &self.running,
            name,
        };

        tracing::debug!(task = name, %now, "Running scheduled check");
        let result = AssertUnwindSafe(task.check.run(now)).catch_unwind().await;

        let (status, outcome, error) = match result {
            Ok(Ok(outcome)) if outcome.failures == 0 => (RunStatus::Succeeded, outcome, None),
            Ok(Ok(outcome)) => (RunStatus::Partial, outcome, None),
            Ok(Err(e)) => (RunStatus::Failed, CheckOutcome::default(), Some(e.to_string())),
            Err(_) => (
                RunStatus::Failed,
                CheckOutcome::default(),
                Some("check panicked".to_string()),
            ),
        };

        let record = TaskStatus {
            task: name,
            started_at,
            finished_at: Utc::now(),
            status,
            scanned: outcome.scanned,
            created: outcome.created,
            failures: outcome.failures,
            error,
        };
        match record.status {
            RunStatus::Failed => tracing::error!(
                task = name,
                error = record.error.as_deref().unwrap_or_default(),
                "Scheduled check failed"
            ),
            _ => tracing::info!(
                task = name,
                scanned = record.scanned,
                created = record.created,
                failures = record.failures,
                "Scheduled check finished"
            ),
        }
        self.statuses.insert(name, record.clone());
        Ok(record)
    }
}
