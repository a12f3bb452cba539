//! End-to-end generation run for one job.
//!
//! The orchestrator owns the job state machine: claim a pending job,
//! run the story step, fan out the three dependent steps, persist the
//! outputs, and land the job in exactly one terminal state. SMS
//! notifications are fired after the terminal transition and never
//! affect the outcome.

use std::sync::Arc;

use drowse_clients::GenerationServices;
use drowse_core::error::CoreError;
use drowse_core::retry::retry_generation;
use drowse_core::step::GenerationStep;
use drowse_core::types::DbId;
use drowse_db::models::asset::NewGeneratedAsset;
use drowse_db::models::job::Job;
use drowse_notify::Notifier;

use crate::steps::{self, StepContext};
use crate::store::PipelineStore;

pub struct JobOrchestrator {
    store: Arc<dyn PipelineStore>,
    services: GenerationServices,
    notifier: Arc<dyn Notifier>,
}

impl JobOrchestrator {
    pub fn new(
        store: Arc<dyn PipelineStore>,
        services: GenerationServices,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            services,
            notifier,
        }
    }

    /// Claim a pending job for this run.
    ///
    /// The claim is an atomic pending -> processing transition, so of
    /// any number of concurrent callers exactly one gets the job; the
    /// rest see a precondition error.
    pub async fn claim(&self, job_id: DbId) -> Result<Job, CoreError> {
        self.store
            .claim_job(job_id)
            .await?
            .ok_or_else(|| CoreError::Precondition(format!("Job {job_id} is not pending")))
    }

    /// Run the full generation pipeline for a claimed job.
    ///
    /// Always lands the job in exactly one terminal state. The
    /// returned error, if any, is the one that failed the job; it has
    /// already been recorded against the job row.
    pub async fn run(&self, job: &Job) -> Result<(), CoreError> {
        tracing::info!(job_id = job.id, token = %job.token, "Starting generation run");

        let asset = match self.generate(job).await {
            Ok(asset) => asset,
            Err(err) => {
                self.mark_failed(job, &err).await;
                return Err(err);
            }
        };

        if let Err(err) = self.store.save_asset(&asset).await {
            self.mark_failed(job, &err).await;
            return Err(err);
        }

        if let Err(err) = self.store.complete_job(job.id).await {
            tracing::error!(job_id = job.id, error = %err, "Failed to mark job completed");
            return Err(err);
        }

        tracing::info!(job_id = job.id, token = %job.token, "Generation run completed");
        if let Some(phone) = self.notification_target(job) {
            if let Err(err) = self.notifier.notify_completion(&phone, &job.token).await {
                tracing::error!(job_id = job.id, error = %err, "Completion SMS failed");
            }
        }
        Ok(())
    }

    /// Produce all four outputs, story first, then the dependent
    /// steps concurrently. When several concurrent steps fail, the
    /// metadata error is reported first, then artwork, then audio.
    async fn generate(&self, job: &Job) -> Result<NewGeneratedAsset, CoreError> {
        self.store.init_steps(job.id).await?;

        let ctx = StepContext {
            store: self.store.as_ref(),
            services: &self.services,
            job_id: job.id,
            job_token: &job.token,
        };
        let customization = job.customization();

        let story = retry_generation(
            GenerationStep::Story,
            || steps::story_attempt(&ctx, &customization),
            |attempts| self.record_attempts(job.id, GenerationStep::Story, attempts),
        )
        .await?;

        let metadata_fut = retry_generation(
            GenerationStep::Metadata,
            || steps::metadata_attempt(&ctx, &story.text),
            |attempts| self.record_attempts(job.id, GenerationStep::Metadata, attempts),
        );
        let artwork_fut = retry_generation(
            GenerationStep::Artwork,
            || steps::artwork_attempt(&ctx, &story),
            |attempts| self.record_attempts(job.id, GenerationStep::Artwork, attempts),
        );
        let audio_fut = retry_generation(
            GenerationStep::Audio,
            || steps::audio_attempt(&ctx, &story.text),
            |attempts| self.record_attempts(job.id, GenerationStep::Audio, attempts),
        );

        let (metadata_res, artwork_res, audio_res) =
            tokio::join!(metadata_fut, artwork_fut, audio_fut);

        let metadata = metadata_res?;
        let artwork = artwork_res?;
        let audio = audio_res?;

        Ok(NewGeneratedAsset {
            job_id: job.id,
            episode_id: story.episode_id,
            story_text: story.text,
            title: metadata.title,
            description: metadata.description,
            artwork_url: artwork.image_url,
            artwork_prompt: artwork.prompt,
            audio_url: audio.audio_url,
        })
    }

    async fn record_attempts(&self, job_id: DbId, step: GenerationStep, attempts: u32) {
        self.store.record_attempts(job_id, step, attempts).await;
    }

    async fn mark_failed(&self, job: &Job, err: &CoreError) {
        tracing::error!(job_id = job.id, token = %job.token, error = %err, "Generation run failed");
        if let Err(db_err) = self.store.fail_job(job.id, &err.root_message()).await {
            tracing::error!(job_id = job.id, error = %db_err, "Failed to mark job failed");
        }
        if let Some(phone) = self.notification_target(job) {
            if let Err(sms_err) = self.notifier.notify_failure(&phone).await {
                tracing::error!(job_id = job.id, error = %sms_err, "Failure SMS failed");
            }
        }
    }

    fn notification_target(&self, job: &Job) -> Option<String> {
        if !job.sms_consent {
            return None;
        }
        job.phone_number.clone()
    }
}
