//! Compliance report handlers.

use axum::Json;
use axum::extract::{Query, State};

use gtms_core::error::AppError;
use gtms_entity::compliance::ReportType;
use gtms_service::compliance::ComplianceReportView;

use crate::dto::request::{ComplianceReportQuery, LimitQuery};
use crate::dto::response::{ApiResponse, ComplianceHistoryResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::rbac::require_patient;
use crate::state::AppState;

const DEFAULT_PERIOD_DAYS: i64 = 30;

/// GET /api/patient/compliance-report
pub async fn compliance_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ComplianceReportQuery>,
) -> Result<Json<ApiResponse<ComplianceReportView>>, ApiError> {
    require_patient(&state, &auth)?;
    let report_type = match query.report_type.as_deref() {
        None | Some("") => ReportType::Overall,
        Some(value) => ReportType::parse(value).ok_or_else(|| {
            AppError::validation(
                "INVALID_REPORT_TYPE",
                format!("Unknown report type '{value}'"),
            )
        })?,
    };

    let report = state
        .compliance_engine
        .build_report(
            auth.user_id,
            query.period.unwrap_or(DEFAULT_PERIOD_DAYS),
            report_type,
        )
        .await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// GET /api/patient/compliance-history
pub async fn compliance_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<ComplianceHistoryResponse>>, ApiError> {
    require_patient(&state, &auth)?;
    let reports = state
        .compliance_engine
        .history(auth.user_id, query.limit)
        .await?;
    Ok(Json(ApiResponse::ok(ComplianceHistoryResponse { reports })))
}
