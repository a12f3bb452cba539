//! Job progress polling.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use drowse_core::error::CoreError;
use drowse_core::types::Timestamp;
use drowse_db::models::progress::StepProgress;
use drowse_db::models::status::{JobStatus, StepStatus};
use drowse_db::repositories::{JobRepo, ProgressRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepProgressView {
    pub step: String,
    pub status: &'static str,
    pub attempt_count: i32,
    pub error: Option<String>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub job_token: String,
    pub status: &'static str,
    pub customization: serde_json::Value,
    pub progress: Vec<StepProgressView>,
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

fn step_view(row: StepProgress) -> StepProgressView {
    let status = StepStatus::from_id(row.status_id)
        .map(StepStatus::name)
        .unwrap_or("unknown");
    StepProgressView {
        step: row.step,
        status,
        attempt_count: row.attempt_count,
        error: row.error_message,
        started_at: row.started_at,
        completed_at: row.completed_at,
    }
}

// ---------------------------------------------------------------------------
// GET /progress/{token}
// ---------------------------------------------------------------------------

/// Current job status plus the per-step progress list, for polling
/// clients.
pub async fn get_progress(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<impl IntoResponse> {
    let job = JobRepo::find_by_token(&state.pool, &token)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Job",
                key: token.clone(),
            })
        })?;

    let progress = ProgressRepo::list_for_job(&state.pool, job.id)
        .await?
        .into_iter()
        .map(step_view)
        .collect();

    let status = JobStatus::from_id(job.status_id)
        .map(JobStatus::name)
        .unwrap_or("unknown");

    let response = ProgressResponse {
        job_token: job.token,
        status,
        customization: job.customization,
        progress,
        error: job.error_message,
        created_at: job.created_at,
        started_at: job.started_at,
        completed_at: job.completed_at,
    };

    Ok(Json(DataResponse { data: response }))
}
