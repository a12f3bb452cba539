//! Single-attempt executors for the four generation steps.
//!
//! Each function performs exactly one attempt: it flips the step's
//! progress row to `running`, does the work, and records `completed`
//! or `failed`. Retry policy lives in the orchestrator, which wraps
//! these attempts; every invocation therefore bumps the attempt count
//! through the `running` transition.

use std::future::Future;

use chrono::Utc;

use drowse_clients::s3::asset_key;
use drowse_clients::GenerationServices;
use drowse_core::artwork::build_image_prompt;
use drowse_core::error::CoreError;
use drowse_core::metadata::{parse_metadata, EpisodeMetadata, ParsedMetadata};
use drowse_core::step::GenerationStep;
use drowse_core::story::{clean_story, generate_episode_id};
use drowse_core::types::DbId;
use drowse_db::models::status::StepStatus;

use crate::prompts;
use crate::store::PipelineStore;

/// Shared inputs for one job's step attempts.
pub struct StepContext<'a> {
    pub store: &'a dyn PipelineStore,
    pub services: &'a GenerationServices,
    pub job_id: DbId,
    pub job_token: &'a str,
}

/// Output of the story step.
#[derive(Debug, Clone)]
pub struct GeneratedStory {
    pub text: String,
    pub episode_id: String,
}

/// Output of the artwork step.
#[derive(Debug, Clone)]
pub struct GeneratedArtwork {
    pub image_url: String,
    /// The generated scene description, kept for the asset record.
    pub prompt: String,
}

/// Output of the audio step.
#[derive(Debug, Clone)]
pub struct GeneratedAudio {
    pub audio_url: String,
}

/// Run one attempt of `work` with progress bookkeeping around it.
async fn tracked<T, Fut>(
    ctx: &StepContext<'_>,
    step: GenerationStep,
    work: Fut,
) -> Result<T, CoreError>
where
    Fut: Future<Output = Result<T, CoreError>>,
{
    ctx.store
        .step_update(ctx.job_id, step, StepStatus::Running, None)
        .await;
    match work.await {
        Ok(value) => {
            ctx.store
                .step_update(ctx.job_id, step, StepStatus::Completed, None)
                .await;
            Ok(value)
        }
        Err(err) => {
            ctx.store
                .step_update(
                    ctx.job_id,
                    step,
                    StepStatus::Failed,
                    Some(&err.root_message()),
                )
                .await;
            Err(err)
        }
    }
}

/// One attempt at generating the story text.
pub async fn story_attempt(
    ctx: &StepContext<'_>,
    customization: &drowse_core::customization::StoryCustomization,
) -> Result<GeneratedStory, CoreError> {
    tracked(ctx, GenerationStep::Story, async {
        let prompt = prompts::build_story_prompt(customization);
        tracing::info!(job_id = ctx.job_id, "Generating story text");
        let raw = ctx
            .services
            .text
            .complete(prompts::STORY_SYSTEM_PROMPT, &prompt, prompts::STORY_PARAMS)
            .await?;
        let text = clean_story(&raw)?;
        Ok(GeneratedStory {
            text,
            episode_id: generate_episode_id(Utc::now()),
        })
    })
    .await
}

/// One attempt at generating the episode title and description.
pub async fn metadata_attempt(
    ctx: &StepContext<'_>,
    story_text: &str,
) -> Result<EpisodeMetadata, CoreError> {
    tracked(ctx, GenerationStep::Metadata, async {
        let prompt = prompts::build_metadata_prompt(story_text);
        tracing::info!(job_id = ctx.job_id, "Generating episode metadata");
        let raw = ctx
            .services
            .text
            .complete(
                prompts::METADATA_SYSTEM_PROMPT,
                &prompt,
                prompts::METADATA_PARAMS,
            )
            .await?;
        match parse_metadata(&raw) {
            ParsedMetadata::Structured(metadata) => Ok(metadata),
            ParsedMetadata::Fallback(metadata) => {
                tracing::warn!(
                    job_id = ctx.job_id,
                    "Metadata response was not valid JSON, using fallback parse"
                );
                Ok(metadata)
            }
        }
    })
    .await
}

/// One attempt at generating and uploading the episode artwork.
///
/// Runs concurrently with metadata, so the metadata passed to the
/// description model is an empty placeholder.
pub async fn artwork_attempt(
    ctx: &StepContext<'_>,
    story: &GeneratedStory,
) -> Result<GeneratedArtwork, CoreError> {
    tracked(ctx, GenerationStep::Artwork, async {
        let placeholder = serde_json::json!({
            "title": "",
            "description": "",
            "episodeId": story.episode_id,
        });
        let prompt = prompts::build_artwork_prompt(&story.text, &placeholder.to_string());

        tracing::info!(job_id = ctx.job_id, "Generating artwork description");
        let description = ctx
            .services
            .text
            .complete(
                prompts::ARTWORK_SYSTEM_PROMPT,
                &prompt,
                prompts::ARTWORK_PARAMS,
            )
            .await?;

        let image_prompt = build_image_prompt(&description);
        tracing::info!(job_id = ctx.job_id, "Generating artwork image");
        let png = ctx.services.images.generate_png(&image_prompt).await?;

        let key = asset_key(Utc::now().date_naive(), ctx.job_token, "artwork", "png");
        let image_url = ctx.services.store.put(&key, png, "image/png").await?;

        Ok(GeneratedArtwork {
            image_url,
            prompt: description,
        })
    })
    .await
}

/// One attempt at narrating the story and uploading the audio.
pub async fn audio_attempt(
    ctx: &StepContext<'_>,
    story_text: &str,
) -> Result<GeneratedAudio, CoreError> {
    tracked(ctx, GenerationStep::Audio, async {
        tracing::info!(job_id = ctx.job_id, "Generating narration audio");
        let mp3 = ctx.services.speech.synthesize(story_text).await?;

        let key = asset_key(Utc::now().date_naive(), ctx.job_token, "audio", "mp3");
        let audio_url = ctx.services.store.put(&key, mp3, "audio/mpeg").await?;

        Ok(GeneratedAudio { audio_url })
    })
    .await
}
