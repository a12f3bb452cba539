//! Job entity model and DTOs.

use drowse_core::customization::StoryCustomization;
use drowse_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::{JobStatus, StatusId};

/// A row from the `jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: DbId,
    /// Externally visible correlation token (progress/download URLs).
    pub token: String,
    pub status_id: StatusId,
    /// Customer story parameters, stored as JSONB.
    pub customization: serde_json::Value,
    pub phone_number: Option<String>,
    pub sms_consent: bool,
    pub payment_session_id: Option<String>,
    /// Present iff the job failed.
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

impl Job {
    /// Typed view of the customization payload. Unknown/missing fields
    /// deserialize to `None` per the all-optional record shape.
    pub fn customization(&self) -> StoryCustomization {
        serde_json::from_value(self.customization.clone()).unwrap_or_default()
    }

    /// The job's lifecycle status, if the ID is a known one.
    pub fn status(&self) -> Option<JobStatus> {
        JobStatus::from_id(self.status_id)
    }
}

/// Fields needed to create a new pending job.
#[derive(Debug, Clone, Deserialize)]
pub struct NewJob {
    pub token: String,
    pub customization: StoryCustomization,
    pub phone_number: Option<String>,
    pub sms_consent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_with_customization(value: serde_json::Value) -> Job {
        Job {
            id: 1,
            token: "2026-08-29-user-abc123".into(),
            status_id: JobStatus::Pending.id(),
            customization: value,
            phone_number: None,
            sms_consent: false,
            payment_session_id: None,
            error_message: None,
            created_at: chrono::Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn customization_parses_typed_fields() {
        let job = job_with_customization(serde_json::json!({
            "characterName": "Luna",
            "values": ["kindness"]
        }));
        let c = job.customization();
        assert_eq!(c.character_name.as_deref(), Some("Luna"));
        assert_eq!(c.values.as_deref(), Some(&["kindness".to_string()][..]));
    }

    #[test]
    fn malformed_customization_degrades_to_default() {
        let job = job_with_customization(serde_json::json!("not an object"));
        assert_eq!(job.customization(), StoryCustomization::default());
    }
}
