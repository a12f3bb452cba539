//! Repository for the `generated_assets` table.

use sqlx::PgPool;

use drowse_core::types::DbId;

use crate::models::asset::{GeneratedAsset, NewGeneratedAsset};

const COLUMNS: &str = "\
    id, job_id, episode_id, story_text, title, description, \
    artwork_url, artwork_prompt, audio_url, created_at";

/// Provides access to the generated outputs of completed jobs.
pub struct AssetRepo;

impl AssetRepo {
    /// Persist the outputs of a finished pipeline run.
    ///
    /// `uq_generated_assets_job` enforces at most one asset row per
    /// job, so a duplicate insert surfaces as a database error rather
    /// than silently overwriting the first run's outputs.
    pub async fn insert(
        pool: &PgPool,
        input: &NewGeneratedAsset,
    ) -> Result<GeneratedAsset, sqlx::Error> {
        let query = format!(
            "INSERT INTO generated_assets \
                 (job_id, episode_id, story_text, title, description, \
                  artwork_url, artwork_prompt, audio_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GeneratedAsset>(&query)
            .bind(input.job_id)
            .bind(&input.episode_id)
            .bind(&input.story_text)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.artwork_url)
            .bind(&input.artwork_prompt)
            .bind(&input.audio_url)
            .fetch_one(pool)
            .await
    }

    /// The asset row for a job, if generation has produced one.
    pub async fn find_by_job(
        pool: &PgPool,
        job_id: DbId,
    ) -> Result<Option<GeneratedAsset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generated_assets WHERE job_id = $1");
        sqlx::query_as::<_, GeneratedAsset>(&query)
            .bind(job_id)
            .fetch_optional(pool)
            .await
    }
}
