//! Repository for the `jobs` table.
//!
//! Uses `JobStatus` from `models::status` for all status transitions.
//! Terminal transitions are guarded in SQL so they are atomic even
//! when a second process races the same job.

use sqlx::PgPool;

use drowse_core::types::DbId;

use crate::models::job::{Job, NewJob};
use crate::models::status::JobStatus;

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, token, status_id, customization, phone_number, sms_consent, \
    payment_session_id, error_message, created_at, started_at, completed_at";

/// Provides CRUD operations for jobs.
pub struct JobRepo;

impl JobRepo {
    /// Create a new pending job.
    pub async fn create(pool: &PgPool, input: &NewJob) -> Result<Job, sqlx::Error> {
        let customization = serde_json::to_value(&input.customization)
            .unwrap_or_else(|_| serde_json::json!({}));
        let query = format!(
            "INSERT INTO jobs (token, status_id, customization, phone_number, sms_consent) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(&input.token)
            .bind(JobStatus::Pending.id())
            .bind(&customization)
            .bind(&input.phone_number)
            .bind(input.sms_consent)
            .fetch_one(pool)
            .await
    }

    /// Find a job by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a job by its correlation token.
    pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE token = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Record the payment session handle created for a job.
    pub async fn set_payment_session(
        pool: &PgPool,
        job_id: DbId,
        session_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE jobs SET payment_session_id = $2 WHERE id = $1")
            .bind(job_id)
            .bind(session_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record the contact number collected during checkout, without
    /// overwriting a number supplied at job creation.
    pub async fn set_phone_if_missing(
        pool: &PgPool,
        job_id: DbId,
        phone: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE jobs SET phone_number = $2 WHERE id = $1 AND phone_number IS NULL")
            .bind(job_id)
            .bind(phone)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Atomically claim a pending job for generation.
    ///
    /// Transitions `pending -> processing` and stamps `started_at`,
    /// but only when the job is still pending. Returns `None` when the
    /// job is in any other state, so a second invocation (possibly
    /// from another process) cannot start a duplicate pipeline.
    pub async fn begin_processing(pool: &PgPool, job_id: DbId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!(
            "UPDATE jobs \
             SET status_id = $2, started_at = NOW() \
             WHERE id = $1 AND status_id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(job_id)
            .bind(JobStatus::Processing.id())
            .bind(JobStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Mark a processing job completed, stamping `completed_at`.
    pub async fn complete(pool: &PgPool, job_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE jobs \
             SET status_id = $2, completed_at = NOW() \
             WHERE id = $1 AND status_id = $3",
        )
        .bind(job_id)
        .bind(JobStatus::Completed.id())
        .bind(JobStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a processing job failed with its error message.
    pub async fn fail(pool: &PgPool, job_id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE jobs \
             SET status_id = $2, error_message = $3, completed_at = NOW() \
             WHERE id = $1 AND status_id = $4",
        )
        .bind(job_id)
        .bind(JobStatus::Failed.id())
        .bind(error)
        .bind(JobStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(())
    }
}
