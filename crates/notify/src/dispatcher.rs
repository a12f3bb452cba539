//! Job lifecycle notification dispatch.

use async_trait::async_trait;

use drowse_core::error::CoreError;

use crate::config::NotifyConfig;
use crate::templates;
use crate::twilio::TwilioClient;

/// Seam between the pipeline and SMS delivery.
///
/// Callers must treat errors as log-and-continue; a notification
/// failure never changes a job's outcome.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Tell the customer their story is ready to download.
    async fn notify_completion(&self, phone: &str, job_token: &str) -> Result<(), CoreError>;

    /// Tell the customer generation failed and how to get a refund.
    async fn notify_failure(&self, phone: &str) -> Result<(), CoreError>;

    /// Confirm payment and set expectations before generation starts.
    async fn notify_payment(&self, phone: &str) -> Result<(), CoreError>;
}

/// Twilio-backed [`Notifier`].
///
/// When Twilio is not configured every call logs and succeeds, so the
/// rest of the system behaves identically with SMS disabled.
#[derive(Clone)]
pub struct NotificationDispatcher {
    twilio: Option<TwilioClient>,
    app_base_url: String,
    support_phone: String,
}

impl NotificationDispatcher {
    pub fn new(config: &NotifyConfig) -> Self {
        let twilio = config.twilio.as_ref().map(|c| {
            TwilioClient::new(
                c.account_sid.clone(),
                c.auth_token.clone(),
                c.from_number.clone(),
            )
        });
        Self {
            twilio,
            app_base_url: config.app_base_url.trim_end_matches('/').to_string(),
            support_phone: config.support_phone.clone(),
        }
    }

    /// Public download page for a job.
    pub fn download_url(&self, job_token: &str) -> String {
        format!("{}/download/{job_token}", self.app_base_url)
    }

    async fn send(&self, phone: &str, body: String) -> Result<(), CoreError> {
        match &self.twilio {
            Some(client) => {
                client.send_sms(phone, &body).await?;
                Ok(())
            }
            None => {
                tracing::warn!("SMS delivery disabled; dropping notification");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl Notifier for NotificationDispatcher {
    async fn notify_completion(&self, phone: &str, job_token: &str) -> Result<(), CoreError> {
        let url = self.download_url(job_token);
        self.send(phone, templates::generation_complete(&url)).await
    }

    async fn notify_failure(&self, phone: &str) -> Result<(), CoreError> {
        self.send(phone, templates::generation_failed(&self.support_phone))
            .await
    }

    async fn notify_payment(&self, phone: &str) -> Result<(), CoreError> {
        self.send(phone, templates::payment_confirmation()).await
    }
}
