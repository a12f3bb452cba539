//! ElevenLabs text-to-speech client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use drowse_core::error::CoreError;

use crate::traits::SpeechSynthesizer;

const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io/v1";

/// Voice settings tuned for slow, even narration.
const MODEL_ID: &str = "eleven_multilingual_v2";
const STABILITY: f64 = 0.5;
const SIMILARITY_BOOST: f64 = 0.8;

/// Client for the ElevenLabs text-to-speech endpoint.
#[derive(Clone)]
pub struct ElevenLabsClient {
    http: Client,
    api_key: String,
    voice_id: String,
    base_url: String,
}

impl ElevenLabsClient {
    pub fn new(api_key: impl Into<String>, voice_id: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            voice_id: voice_id.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the API base URL (test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, CoreError> {
        let url = format!("{}/text-to-speech/{}", self.base_url, self.voice_id);
        let request = SpeechRequest {
            text,
            model_id: MODEL_ID,
            voice_settings: VoiceSettings {
                stability: STABILITY,
                similarity_boost: SIMILARITY_BOOST,
            },
        };

        tracing::debug!(text_chars = text.chars().count(), "Requesting speech synthesis");
        let response = self
            .http
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/mpeg")
            .json(&request)
            .send()
            .await
            .map_err(|e| CoreError::Internal(format!("ElevenLabs request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to read audio payload: {e}")))?;
        if bytes.is_empty() {
            return Err(CoreError::EmptyGeneration(
                "ElevenLabs returned an empty audio payload".into(),
            ));
        }
        Ok(bytes.to_vec())
    }
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

// f64 so the wire values serialize exactly as written (0.5, 0.8).
#[derive(Serialize)]
struct VoiceSettings {
    stability: f64,
    similarity_boost: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speech_request_carries_narration_settings() {
        let request = SpeechRequest {
            text: "Once upon a time",
            model_id: MODEL_ID,
            voice_settings: VoiceSettings {
                stability: STABILITY,
                similarity_boost: SIMILARITY_BOOST,
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model_id"], "eleven_multilingual_v2");
        assert_eq!(value["voice_settings"]["stability"], 0.5);
        assert_eq!(value["voice_settings"]["similarity_boost"], 0.8);
    }
}
