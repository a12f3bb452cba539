//! Completed-story bundle download.

use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};

use drowse_core::error::CoreError;
use drowse_db::models::status::JobStatus;
use drowse_db::repositories::{AssetRepo, JobRepo};

use crate::bundle;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /downloads/{token}
// ---------------------------------------------------------------------------

/// Stream the ZIP bundle for a completed job.
///
/// Jobs in any non-completed state 404, the same as unknown tokens,
/// so the download URL leaks nothing about in-flight jobs.
pub async fn download_bundle(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Response> {
    let job = JobRepo::find_by_token(&state.pool, &token)
        .await?
        .filter(|j| j.status() == Some(JobStatus::Completed))
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Download",
                key: token.clone(),
            })
        })?;

    let asset = AssetRepo::find_by_job(&state.pool, job.id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "GeneratedAsset",
                key: token.clone(),
            })
        })?;

    let bundle = bundle::build_bundle(state.assets.as_ref(), &job, &asset).await?;

    tracing::info!(
        job_id = job.id,
        token = %job.token,
        bytes = bundle.bytes.len(),
        "Serving download bundle",
    );

    let headers = [
        (CONTENT_TYPE, "application/zip".to_string()),
        (
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", bundle.filename),
        ),
    ];
    Ok((headers, bundle.bytes).into_response())
}
