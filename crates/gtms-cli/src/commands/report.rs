//! Build a compliance report from the command line.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use gtms_core::config::AppConfig;
use gtms_core::error::AppError;
use gtms_database::Stores;
use gtms_entity::compliance::ReportType;
use gtms_service::compliance::{ComplianceEngine, ComplianceReportView};

use crate::output::{self, OutputFormat};

/// Arguments for the report command
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Patient ID
    pub patient_id: Uuid,

    /// Days covered, ending today
    #[arg(short, long, default_value_t = 30)]
    pub period: i64,

    /// overall, medication, appointment or notification
    #[arg(short = 't', long = "type", default_value = "overall")]
    pub report_type: String,
}

#[derive(Debug, Serialize, Tabled)]
struct MedicationRow {
    medication: String,
    total_doses: i64,
    taken: i64,
    skipped: i64,
    delayed: i64,
    compliance_rate: f64,
    grade: String,
}

#[derive(Debug, Serialize, Tabled)]
struct SummaryRow {
    section: &'static str,
    value: String,
}

fn summary(report: &ComplianceReportView) -> Vec<SummaryRow> {
    let mut rows = vec![SummaryRow {
        section: "period",
        value: format!(
            "{} to {} ({} days)",
            report.period_start, report.period_end, report.period_days
        ),
    }];
    if let Some(overall) = &report.overall_medication_compliance {
        rows.push(SummaryRow {
            section: "medication",
            value: format!(
                "{}/{} doses, {:.2}% ({})",
                overall.total_taken,
                overall.total_reminders,
                overall.compliance_rate,
                overall.grade.as_str()
            ),
        });
    }
    if let Some(appointments) = &report.appointment_compliance {
        rows.push(SummaryRow {
            section: "appointments",
            value: format!(
                "{}/{} attended, {:.2}%",
                appointments.attended,
                appointments.total_appointments,
                appointments.attendance_rate
            ),
        });
    }
    for rec in &report.recommendations {
        rows.push(SummaryRow {
            section: "recommendation",
            value: format!("[{}] {}", rec.priority, rec.title),
        });
    }
    rows
}

/// Execute the report command
pub async fn execute(
    args: &ReportArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let report_type = ReportType::parse(&args.report_type).ok_or_else(|| {
        AppError::validation(
            "INVALID_REPORT_TYPE",
            format!("Unknown report type '{}'", args.report_type),
        )
    })?;

    let db = super::connect(config).await?;
    let engine = ComplianceEngine::new(
        Stores::postgres(db.pool().clone()).compliance,
        config.scheduler.offset(),
        config.notifications.locale,
    );
    let report = engine
        .build_report(args.patient_id, args.period, report_type)
        .await?;

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            if let Some(meds) = &report.medication_compliance {
                let rows: Vec<MedicationRow> = meds
                    .iter()
                    .map(|m| MedicationRow {
                        medication: m.medication_name.clone(),
                        total_doses: m.total_doses,
                        taken: m.taken,
                        skipped: m.skipped,
                        delayed: m.delayed,
                        compliance_rate: m.compliance_rate,
                        grade: m.grade.as_str().to_string(),
                    })
                    .collect();
                output::print_list(&rows, format);
            }
            output::print_list(&summary(&report), format);
        }
    }

    db.close().await;
    Ok(())
}
