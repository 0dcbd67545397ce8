//! Run a scheduled check once.

use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use gtms_api::app::push_transport;
use gtms_core::config::AppConfig;
use gtms_core::error::AppError;
use gtms_database::Stores;
use gtms_worker::{RunStatus, TaskStatus};

use crate::output::{self, OutputFormat};

/// Arguments for the check command
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Task name: high_iop, missed_medication, low_inventory or appointment_reminder
    pub name: String,
}

#[derive(Debug, Serialize, Tabled)]
struct StatusRow {
    task: String,
    status: String,
    scanned: u32,
    created: u32,
    failures: u32,
    duration_ms: i64,
    error: String,
}

impl From<&TaskStatus> for StatusRow {
    fn from(s: &TaskStatus) -> Self {
        Self {
            task: s.task.to_string(),
            status: serde_json::to_value(s.status)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default(),
            scanned: s.scanned,
            created: s.created,
            failures: s.failures,
            duration_ms: (s.finished_at - s.started_at).num_milliseconds(),
            error: s.error.clone().unwrap_or_default(),
        }
    }
}

/// Execute the check command
pub async fn execute(
    args: &CheckArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let db = super::connect(config).await?;
    let stores = Stores::postgres(db.pool().clone());
    let state = gtms_api::AppState::new(config.clone(), stores, Some(db.clone()), push_transport(config));
    let runner = Arc::clone(&state.task_runner);

    let status = runner.run(&args.name).await?;
    match format {
        OutputFormat::Json => output::print_json(&status),
        OutputFormat::Table => output::print_list(&[StatusRow::from(&status)], format),
    }
    if status.status == RunStatus::Failed {
        output::print_warning("Check failed; see the error column");
    }

    db.close().await;
    Ok(())
}
