//! Cron scheduler for the periodic checks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use gtms_core::error::AppError;

use crate::runner::TaskRunner;

/// Cron-based scheduler that invokes the task runner
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Runner the cron jobs delegate to
    runner: Arc<TaskRunner>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("tasks", &self.runner.schedule())
            .finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(runner: Arc<TaskRunner>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {}", e)))?;

        Ok(Self { scheduler, runner })
    }

    /// Register one cron job per runner task
    pub async fn register_tasks(&self) -> Result<(), AppError> {
        let offset = self.runner.offset();
        for (name, cron) in self.runner.schedule() {
            let runner = Arc::clone(&self.runner);
            let job = CronJob::new_async_tz(cron.as_str(), offset, move |_uuid, _lock| {
                let runner = Arc::clone(&runner);
                Box::pin(async move {
                    if let Err(e) = runner.run(name).await {
                        tracing::error!("Failed to run {}: {}", name, e);
                    }
                })
            })
            .map_err(|e| {
                AppError::configuration(format!("Invalid schedule for {} ({}): {}", name, cron, e))
            })?;

            self.scheduler.add(job).await.map_err(|e| {
                AppError::internal(format!("Failed to add {} schedule: {}", name, e))
            })?;

            tracing::info!("Registered: {} ({})", name, cron);
        }

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&mut self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {}", e)))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {}", e)))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[tokio::test]
    async fn test_invalid_cron_is_a_configuration_error() {
        use crate::checks::{CheckError, CheckOutcome, ScheduledCheck};
        use async_trait::async_trait;

        #[derive(Debug)]
        struct Noop;

        #[async_trait]
        impl ScheduledCheck for Noop {
            fn name(&self) -> &'static str {
                "noop"
            }
            async fn run(&self, _: chrono::NaiveDateTime) -> Result<CheckOutcome, CheckError> {
                Ok(CheckOutcome::default())
            }
        }

        let mut runner = TaskRunner::new(FixedOffset::east_opt(0).unwrap());
        runner.register(Arc::new(Noop), "not a cron");
        let scheduler = CronScheduler::new(Arc::new(runner)).await.unwrap();
        let err = scheduler.register_tasks().await.unwrap_err();
        assert_eq!(err.kind, gtms_core::error::ErrorKind::Configuration);
    }
}
