//! Minimal Twilio Messages API client.

use reqwest::Client;
use serde::Deserialize;

use drowse_core::error::CoreError;
use drowse_core::phone::format_phone_number;

const DEFAULT_BASE_URL: &str = "https://api.twilio.com";

/// Client for sending SMS through the Twilio REST API.
#[derive(Clone)]
pub struct TwilioClient {
    http: Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
    base_url: String,
}

#[derive(Deserialize)]
struct MessageResponse {
    sid: String,
}

impl TwilioClient {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from_number: from_number.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the API base URL (test servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Send one SMS, returning the Twilio message SID.
    ///
    /// The recipient number is normalized to E.164 before sending.
    pub async fn send_sms(&self, to: &str, body: &str) -> Result<String, CoreError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );
        let to = format_phone_number(to);
        let form = [
            ("To", to.as_str()),
            ("From", self.from_number.as_str()),
            ("Body", body),
        ];

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| CoreError::Internal(format!("Twilio request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let message: MessageResponse = response
            .json()
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to parse Twilio response: {e}")))?;

        tracing::info!(sid = %message.sid, "SMS sent");
        Ok(message.sid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_response_parses_sid() {
        let raw = r#"{"sid":"SM123","status":"queued"}"#;
        let parsed: MessageResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.sid, "SM123");
    }
}
