//! Payment provider webhook.
//!
//! The provider retries deliveries, so the handler is idempotent: a
//! verified `checkout.session.completed` for a job that is no longer
//! pending acknowledges without starting a second pipeline.

use std::collections::HashMap;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use drowse_core::error::CoreError;
use drowse_core::phone::format_phone_number;
use drowse_core::signature::{verify_webhook_signature, DEFAULT_TOLERANCE_SECS};
use drowse_db::repositories::JobRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

const SIGNATURE_HEADER: &str = "stripe-signature";
const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    kind: String,
    data: EventData,
}

#[derive(Debug, Deserialize)]
struct EventData {
    object: EventObject,
}

#[derive(Debug, Deserialize)]
struct EventObject {
    id: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
    customer_details: Option<CustomerDetails>,
}

#[derive(Debug, Deserialize)]
struct CustomerDetails {
    phone: Option<String>,
}

// ---------------------------------------------------------------------------
// POST /webhooks/payment
// ---------------------------------------------------------------------------

/// Handle a signed payment webhook delivery.
///
/// On a verified checkout completion: record the checkout phone
/// number, send the payment-confirmation SMS, claim the job, and
/// spawn the generation pipeline. The response returns immediately;
/// progress is tracked through the database.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> AppResult<impl IntoResponse> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing signature header".to_string()))?;

    verify_webhook_signature(
        body.as_bytes(),
        signature,
        &state.config.webhook_secret,
        DEFAULT_TOLERANCE_SECS,
        Utc::now().timestamp(),
    )?;

    let event: WebhookEvent = serde_json::from_str(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed webhook payload: {e}")))?;

    if event.kind != CHECKOUT_COMPLETED {
        tracing::debug!(kind = %event.kind, "Ignoring webhook event");
        return Ok(Json(json!({ "received": true })));
    }

    let session = event.data.object;
    let token = session
        .metadata
        .get("job_token")
        .ok_or_else(|| AppError::BadRequest("Event metadata missing job_token".to_string()))?;

    let job = JobRepo::find_by_token(&state.pool, token)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Job",
                key: token.clone(),
            })
        })?;

    tracing::info!(
        job_id = job.id,
        token = %job.token,
        session_id = %session.id,
        "Payment confirmed",
    );

    // Prefer the number collected at checkout when none was supplied
    // up front.
    if let Some(phone) = session.customer_details.and_then(|d| d.phone) {
        let formatted = format_phone_number(&phone);
        JobRepo::set_phone_if_missing(&state.pool, job.id, &formatted).await?;
    }

    // Re-read so the confirmation SMS sees the checkout phone number.
    let job = JobRepo::find_by_id(&state.pool, job.id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Job",
            key: token.clone(),
        })
    })?;

    if job.sms_consent {
        if let Some(phone) = &job.phone_number {
            if let Err(e) = state.notifier.notify_payment(phone).await {
                tracing::error!(job_id = job.id, error = %e, "Payment confirmation SMS failed");
            }
        }
    }

    match state.orchestrator.claim(job.id).await {
        Ok(claimed) => {
            let orchestrator = state.orchestrator.clone();
            // Fire and forget; the run records its own outcome.
            tokio::spawn(async move {
                let _ = orchestrator.run(&claimed).await;
            });
            tracing::info!(job_id = job.id, "Generation pipeline started");
        }
        Err(e) => {
            // Duplicate delivery or an already-finished job.
            tracing::info!(job_id = job.id, error = %e, "Not starting generation");
        }
    }

    Ok(Json(json!({ "received": true })))
}
