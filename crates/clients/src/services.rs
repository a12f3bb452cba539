//! Bundle of service handles injected into the generation pipeline.

use std::sync::Arc;

use crate::config::ClientsConfig;
use crate::elevenlabs::ElevenLabsClient;
use crate::openai::OpenAiClient;
use crate::s3::S3Store;
use crate::traits::{ImageGenerator, ObjectStore, SpeechSynthesizer, TextGenerator};

/// One handle per external capability the pipeline needs.
///
/// Cloning is cheap; all handles are `Arc`s.
#[derive(Clone)]
pub struct GenerationServices {
    pub text: Arc<dyn TextGenerator>,
    pub images: Arc<dyn ImageGenerator>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub store: Arc<dyn ObjectStore>,
}

impl GenerationServices {
    /// Wire up the production clients from configuration.
    pub async fn from_config(config: &ClientsConfig) -> Self {
        let openai = Arc::new(OpenAiClient::new(
            config.openai_api_key.clone(),
            config.openai_model.clone(),
        ));
        let speech = Arc::new(ElevenLabsClient::new(
            config.elevenlabs_api_key.clone(),
            config.elevenlabs_voice_id.clone(),
        ));
        let store = Arc::new(
            S3Store::from_env(config.s3_bucket.clone(), config.aws_region.clone()).await,
        );
        Self {
            text: openai.clone(),
            images: openai,
            speech,
            store,
        }
    }
}
