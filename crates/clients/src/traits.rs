//! Service seams for the generation pipeline.
//!
//! The pipeline only ever talks to these traits; the concrete clients
//! in this crate implement them against the real services, and tests
//! substitute in-memory fakes.

use async_trait::async_trait;

use drowse_core::error::CoreError;

/// Sampling parameters for a single chat completion call.
#[derive(Debug, Clone, Copy)]
pub struct ChatParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Produces prose from a system/user prompt pair.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: ChatParams,
    ) -> Result<String, CoreError>;
}

/// Produces a PNG image from a text prompt.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_png(&self, prompt: &str) -> Result<Vec<u8>, CoreError>;
}

/// Produces MP3 narration audio from story text.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, CoreError>;
}

/// Stores an asset and returns its publicly reachable URL.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, CoreError>;

    /// Fetch a previously stored asset by its public URL.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, CoreError>;
}
