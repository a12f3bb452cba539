//! Repository for the `step_progress` table.
//!
//! One row exists per (job, step) pair; rows are created up front when
//! the pipeline claims a job, then updated in place as steps run. The
//! unique constraint `uq_step_progress_job_step` makes initialization
//! idempotent.

use sqlx::PgPool;

use drowse_core::step::GenerationStep;
use drowse_core::types::DbId;

use crate::models::progress::StepProgress;
use crate::models::status::StepStatus;

const COLUMNS: &str = "\
    id, job_id, step, status_id, attempt_count, error_message, \
    created_at, started_at, completed_at";

/// Provides step-level progress tracking for jobs.
pub struct ProgressRepo;

impl ProgressRepo {
    /// Insert a pending row for every generation step of a job.
    ///
    /// Safe to call more than once; existing rows are left untouched.
    pub async fn initialize_steps(pool: &PgPool, job_id: DbId) -> Result<(), sqlx::Error> {
        for step in GenerationStep::ALL {
            sqlx::query(
                "INSERT INTO step_progress (job_id, step, status_id) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT ON CONSTRAINT uq_step_progress_job_step DO NOTHING",
            )
            .bind(job_id)
            .bind(step.as_str())
            .bind(StepStatus::Pending.id())
            .execute(pool)
            .await?;
        }
        Ok(())
    }

    /// Transition a step to a new status.
    ///
    /// Entering `running` stamps `started_at` (first time only) and
    /// bumps `attempt_count`; terminal statuses stamp `completed_at`.
    /// The error message is cleared on non-failed transitions so a
    /// retried step does not carry a stale message while running.
    pub async fn update_status(
        pool: &PgPool,
        job_id: DbId,
        step: GenerationStep,
        status: StepStatus,
        error_message: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        let is_running = status == StepStatus::Running;
        let is_terminal = status.is_terminal();
        sqlx::query(
            "UPDATE step_progress SET \
                 status_id = $3, \
                 error_message = $4, \
                 started_at = CASE WHEN $5 THEN COALESCE(started_at, NOW()) ELSE started_at END, \
                 attempt_count = attempt_count + CASE WHEN $5 THEN 1 ELSE 0 END, \
                 completed_at = CASE WHEN $6 THEN NOW() ELSE completed_at END \
             WHERE job_id = $1 AND step = $2",
        )
        .bind(job_id)
        .bind(step.as_str())
        .bind(status.id())
        .bind(error_message)
        .bind(is_running)
        .bind(is_terminal)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Overwrite the attempt count for a step.
    ///
    /// Used after retry exhaustion to record how many attempts the
    /// retry loop actually made, which can exceed the number of
    /// `running` transitions observed by `update_status`.
    pub async fn set_attempts(
        pool: &PgPool,
        job_id: DbId,
        step: GenerationStep,
        attempts: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE step_progress SET attempt_count = $3 WHERE job_id = $1 AND step = $2")
            .bind(job_id)
            .bind(step.as_str())
            .bind(attempts)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// All progress rows for a job, in creation order.
    pub async fn list_for_job(pool: &PgPool, job_id: DbId) -> Result<Vec<StepProgress>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM step_progress WHERE job_id = $1 ORDER BY id");
        sqlx::query_as::<_, StepProgress>(&query)
            .bind(job_id)
            .fetch_all(pool)
            .await
    }
}
