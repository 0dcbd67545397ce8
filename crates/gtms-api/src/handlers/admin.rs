//! Operator handlers for the scheduled checks.

use axum::Json;
use axum::extract::{Path, State};

use crate::dto::response::{ApiResponse, TaskListResponse, TaskRunResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::rbac::require_admin;
use crate::state::AppState;

/// GET /api/admin/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<TaskListResponse>>, ApiError> {
    require_admin(&state, &auth)?;
    Ok(Json(ApiResponse::ok(TaskListResponse {
        tasks: state.task_runner.tasks(),
    })))
}

/// POST /api/admin/tasks/{name}/run
pub async fn run_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<TaskRunResponse>>, ApiError> {
    require_admin(&state, &auth)?;
    tracing::info!(task = %name, user_id = %auth.user_id, "Manual task run requested");
    let status = state.task_runner.run(&name).await?;
    Ok(Json(ApiResponse::ok(TaskRunResponse { status })))
}
