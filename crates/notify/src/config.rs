//! Environment configuration for SMS delivery.

/// Twilio credentials plus the values templates interpolate.
///
/// All Twilio fields are optional as a unit: when any credential is
/// missing the dispatcher runs with SMS disabled instead of failing
/// startup, since notifications are best-effort.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub twilio: Option<TwilioCredentials>,
    /// Public base URL of the app, used to build download links.
    pub app_base_url: String,
    /// Support phone number included in failure messages.
    pub support_phone: String,
}

#[derive(Debug, Clone)]
pub struct TwilioCredentials {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

impl NotifyConfig {
    pub fn from_env() -> Self {
        let twilio = match (
            std::env::var("TWILIO_ACCOUNT_SID"),
            std::env::var("TWILIO_AUTH_TOKEN"),
            std::env::var("TWILIO_PHONE_NUMBER"),
        ) {
            (Ok(account_sid), Ok(auth_token), Ok(from_number)) => Some(TwilioCredentials {
                account_sid,
                auth_token,
                from_number,
            }),
            _ => {
                tracing::warn!("Twilio credentials not configured; SMS delivery is disabled");
                None
            }
        };

        Self {
            twilio,
            app_base_url: std::env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            support_phone: std::env::var("CUSTOMER_SERVICE_PHONE").unwrap_or_default(),
        }
    }
}
