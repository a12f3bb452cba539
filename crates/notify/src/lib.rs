//! SMS notifications for job lifecycle events.
//!
//! Notification delivery is best-effort by design: a failed text must
//! never change the outcome of a paid generation job. Callers treat
//! errors from [`Notifier`] as log-and-continue.

pub mod config;
pub mod dispatcher;
pub mod templates;
pub mod twilio;

pub use config::NotifyConfig;
pub use dispatcher::{NotificationDispatcher, Notifier};
pub use twilio::TwilioClient;
