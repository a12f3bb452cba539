pub mod downloads;
pub mod payments;
pub mod progress;
pub mod webhooks;
