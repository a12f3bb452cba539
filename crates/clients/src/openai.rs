//! OpenAI REST API client for chat completions and image generation.

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use drowse_core::error::CoreError;

use crate::traits::{ChatParams, ImageGenerator, TextGenerator};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Model used for image generation. Chat models are configurable;
/// the image endpoint only accepts this one for b64 output.
const IMAGE_MODEL: &str = "gpt-image-1";
const IMAGE_SIZE: &str = "1024x1024";

/// Client for the OpenAI chat and image endpoints.
#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
        }
    }

    /// Override the API base URL (proxies, test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// The chat model this client sends requests to.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, CoreError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| CoreError::Internal(format!("OpenAI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::Service {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to parse OpenAI response: {e}")))
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: ChatParams,
    ) -> Result<String, CoreError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        tracing::debug!(model = %self.model, "Requesting chat completion");
        let response: ChatResponse = self.post_json("/chat/completions", &request).await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(CoreError::EmptyGeneration(
                "OpenAI returned empty completion content".into(),
            ));
        }
        Ok(content)
    }
}

#[async_trait]
impl ImageGenerator for OpenAiClient {
    async fn generate_png(&self, prompt: &str) -> Result<Vec<u8>, CoreError> {
        let request = ImageRequest {
            model: IMAGE_MODEL,
            prompt,
            n: 1,
            size: IMAGE_SIZE,
        };

        tracing::debug!(prompt_chars = prompt.chars().count(), "Requesting image generation");
        let response: ImageResponse = self.post_json("/images/generations", &request).await?;

        let b64 = response
            .data
            .into_iter()
            .next()
            .and_then(|d| d.b64_json)
            .ok_or_else(|| {
                CoreError::EmptyGeneration("OpenAI returned no image data".into())
            })?;

        base64::engine::general_purpose::STANDARD
            .decode(b64.as_bytes())
            .map_err(|e| CoreError::Internal(format!("Failed to decode image payload: {e}")))
    }
}

// --- Wire types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
    size: &'a str,
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    b64_json: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_response_parses_content() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"  A story.  "}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        let content = parsed.choices[0].message.content.as_deref();
        assert_eq!(content, Some("  A story.  "));
    }

    #[test]
    fn chat_response_tolerates_missing_choices() {
        let parsed: ChatResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.choices.is_empty());
    }

    #[test]
    fn image_response_parses_b64_payload() {
        let raw = r#"{"data":[{"b64_json":"aGVsbG8="}]}"#;
        let parsed: ImageResponse = serde_json::from_str(raw).unwrap();
        let b64 = parsed.data[0].b64_json.as_deref().unwrap();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(b64.as_bytes())
            .unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn chat_request_serializes_expected_fields() {
        let request = ChatRequest {
            model: "gpt-4o",
            messages: vec![ChatMessage {
                role: "system",
                content: "hi",
            }],
            temperature: 0.8,
            max_tokens: 1800,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o");
        assert_eq!(value["max_tokens"], 1800);
        assert_eq!(value["messages"][0]["role"], "system");
    }
}
