//! Generated asset record: the write-once output of a completed job.

use drowse_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `generated_assets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GeneratedAsset {
    pub id: DbId,
    pub job_id: DbId,
    pub episode_id: String,
    pub story_text: String,
    pub title: String,
    pub description: String,
    pub artwork_url: String,
    pub artwork_prompt: String,
    pub audio_url: String,
    pub created_at: Timestamp,
}

/// Fields for the single insert performed at job completion.
#[derive(Debug, Clone)]
pub struct NewGeneratedAsset {
    pub job_id: DbId,
    pub episode_id: String,
    pub story_text: String,
    pub title: String,
    pub description: String,
    pub artwork_url: String,
    pub artwork_prompt: String,
    pub audio_url: String,
}
