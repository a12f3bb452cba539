//! Step progress rows, one per (job, step) pair.

use drowse_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::status::StatusId;

/// A row from the `step_progress` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StepProgress {
    pub id: DbId,
    pub job_id: DbId,
    /// One of the four step names, e.g. `story_generation`.
    pub step: String,
    pub status_id: StatusId,
    pub attempt_count: i32,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}
