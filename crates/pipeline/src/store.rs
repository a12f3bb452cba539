//! Persistence seam for the generation pipeline.
//!
//! The orchestrator never talks to the database directly; it goes
//! through [`PipelineStore`] so tests can run it against an in-memory
//! implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use drowse_core::error::CoreError;
use drowse_core::step::GenerationStep;
use drowse_core::types::DbId;
use drowse_db::models::asset::NewGeneratedAsset;
use drowse_db::models::job::Job;
use drowse_db::models::status::StepStatus;
use drowse_db::repositories::{AssetRepo, JobRepo, ProgressRepo};

/// Everything the pipeline persists while it runs.
///
/// The fallible operations participate in the job's outcome; the two
/// step-progress methods are best-effort and must never fail the run,
/// so they return nothing and implementations log their own errors.
#[async_trait]
pub trait PipelineStore: Send + Sync {
    /// Claim a pending job for processing. `None` means the job was
    /// not pending, so nothing was claimed.
    async fn claim_job(&self, job_id: DbId) -> Result<Option<Job>, CoreError>;

    /// Create pending progress rows for every step of the job.
    async fn init_steps(&self, job_id: DbId) -> Result<(), CoreError>;

    /// Record a step status transition. Best-effort.
    async fn step_update(
        &self,
        job_id: DbId,
        step: GenerationStep,
        status: StepStatus,
        error: Option<&str>,
    );

    /// Record how many attempts a step consumed. Best-effort.
    async fn record_attempts(&self, job_id: DbId, step: GenerationStep, attempts: u32);

    /// Persist the outputs of a finished run. At most once per job.
    async fn save_asset(&self, asset: &NewGeneratedAsset) -> Result<(), CoreError>;

    /// Transition the job to its completed terminal state.
    async fn complete_job(&self, job_id: DbId) -> Result<(), CoreError>;

    /// Transition the job to its failed terminal state.
    async fn fail_job(&self, job_id: DbId, error: &str) -> Result<(), CoreError>;
}

/// Production [`PipelineStore`] backed by Postgres.
#[derive(Clone)]
pub struct PgPipelineStore {
    pool: PgPool,
}

impl PgPipelineStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn persistence(e: sqlx::Error) -> CoreError {
    CoreError::Persistence(e.to_string())
}

#[async_trait]
impl PipelineStore for PgPipelineStore {
    async fn claim_job(&self, job_id: DbId) -> Result<Option<Job>, CoreError> {
        JobRepo::begin_processing(&self.pool, job_id)
            .await
            .map_err(persistence)
    }

    async fn init_steps(&self, job_id: DbId) -> Result<(), CoreError> {
        ProgressRepo::initialize_steps(&self.pool, job_id)
            .await
            .map_err(persistence)
    }

    async fn step_update(
        &self,
        job_id: DbId,
        step: GenerationStep,
        status: StepStatus,
        error: Option<&str>,
    ) {
        if let Err(e) = ProgressRepo::update_status(&self.pool, job_id, step, status, error).await {
            tracing::error!(job_id, step = %step, error = %e, "Failed to record step progress");
        }
    }

    async fn record_attempts(&self, job_id: DbId, step: GenerationStep, attempts: u32) {
        if let Err(e) = ProgressRepo::set_attempts(&self.pool, job_id, step, attempts as i32).await
        {
            tracing::error!(job_id, step = %step, error = %e, "Failed to record step attempts");
        }
    }

    async fn save_asset(&self, asset: &NewGeneratedAsset) -> Result<(), CoreError> {
        AssetRepo::insert(&self.pool, asset)
            .await
            .map(|_| ())
            .map_err(persistence)
    }

    async fn complete_job(&self, job_id: DbId) -> Result<(), CoreError> {
        JobRepo::complete(&self.pool, job_id)
            .await
            .map_err(persistence)
    }

    async fn fail_job(&self, job_id: DbId, error: &str) -> Result<(), CoreError> {
        JobRepo::fail(&self.pool, job_id, error)
            .await
            .map_err(persistence)
    }
}
