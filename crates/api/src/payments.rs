//! Payment provider client.
//!
//! The provider sits behind [`PaymentProvider`] so handlers and tests
//! never depend on the Stripe wire protocol directly. The production
//! client creates hosted checkout sessions over Stripe's
//! form-encoded REST API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use drowse_core::error::CoreError;

const DEFAULT_BASE_URL: &str = "https://api.stripe.com";

/// Story price in the smallest currency unit (USD cents).
const STORY_PRICE_CENTS: u32 = 100;

/// A created hosted-checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted payment page for the customer.
    pub url: String,
}

/// Creates checkout sessions for story purchases.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a checkout session carrying the job token in its
    /// metadata so the success webhook can correlate the payment.
    async fn create_checkout_session(
        &self,
        job_token: &str,
        character_name: Option<&str>,
    ) -> Result<CheckoutSession, CoreError>;
}

/// Stripe-backed [`PaymentProvider`].
#[derive(Clone)]
pub struct StripeClient {
    http: Client,
    secret_key: String,
    app_base_url: String,
    base_url: String,
}

impl StripeClient {
    pub fn new(secret_key: impl Into<String>, app_base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            secret_key: secret_key.into(),
            app_base_url: app_base_url.into(),
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
impl PaymentProvider for StripeClient {
    async fn create_checkout_session(
        &self,
        job_token: &str,
        character_name: Option<&str>,
    ) -> Result<CheckoutSession, CoreError> {
        let url = format!("{}/v1/checkout/sessions", self.base_url);
        let description = format!(
            "A personalized sleep story featuring {}",
            character_name.unwrap_or("your character")
        );
        let success_url = format!(
            "{}/progress/{job_token}?session_id={{CHECKOUT_SESSION_ID}}",
            self.app_base_url
        );
        let cancel_url = format!("{}?cancelled=true", self.app_base_url);
        let amount = STORY_PRICE_CENTS.to_string();

        let form: Vec<(&str, &str)> = vec![
            ("mode", "payment"),
            ("payment_method_types[0]", "card"),
            ("line_items[0][price_data][currency]", "usd"),
            (
                "line_items[0][price_data][product_data][name]",
                "Custom Sleep Story",
            ),
            (
                "line_items[0][price_data][product_data][description]",
                &description,
            ),
            ("line_items[0][price_data][unit_amount]", &amount),
            ("line_items[0][quantity]", "1"),
            ("success_url", &success_url),
            ("cancel_url", &cancel_url),
            ("metadata[job_token]", job_token),
            ("phone_number_collection[enabled]", "true"),
        ];

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| CoreError::Internal(format!("Payment provider request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let session: CheckoutSession = response.json().await.map_err(|e| {
            CoreError::Internal(format!("Failed to parse checkout session: {e}"))
        })?;

        tracing::info!(session_id = %session.id, job_token, "Checkout session created");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_session_parses_id_and_url() {
        let raw = r#"{"id":"cs_test_123","url":"https://checkout.stripe.com/c/pay/cs_test_123","object":"checkout.session"}"#;
        let session: CheckoutSession = serde_json::from_str(raw).unwrap();
        assert_eq!(session.id, "cs_test_123");
        assert!(session.url.starts_with("https://checkout.stripe.com/"));
    }
}
