//! Environment configuration for the external service clients.

use drowse_core::error::CoreError;

const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_BUCKET: &str = "key-to-sleep-assets";

/// Credentials and endpoints for every external service.
#[derive(Debug, Clone)]
pub struct ClientsConfig {
    pub openai_api_key: String,
    pub openai_model: String,
    pub elevenlabs_api_key: String,
    pub elevenlabs_voice_id: String,
    pub aws_region: String,
    pub s3_bucket: String,
}

impl ClientsConfig {
    /// Load from environment variables, failing on missing credentials.
    pub fn from_env() -> Result<Self, CoreError> {
        Ok(Self {
            openai_api_key: require("OPENAI_API_KEY")?,
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string()),
            elevenlabs_api_key: require("ELEVENLABS_API_KEY")?,
            elevenlabs_voice_id: require("ELEVENLABS_VOICE_ID")?,
            aws_region: std::env::var("AWS_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string()),
            s3_bucket: std::env::var("AWS_S3_BUCKET_NAME")
                .unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
        })
    }
}

fn require(name: &str) -> Result<String, CoreError> {
    std::env::var(name).map_err(|_| CoreError::Config(format!("{name} not set")))
}
