//! Payment session creation.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use drowse_core::customization::StoryCustomization;
use drowse_core::phone::is_valid_phone_number;
use drowse_core::token::generate_job_token;
use drowse_db::models::job::NewJob;
use drowse_db::repositories::{JobRepo, ProgressRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    #[serde(default)]
    pub customization: StoryCustomization,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub sms_consent: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCreatedResponse {
    pub job_token: String,
    pub session_id: String,
    pub checkout_url: String,
}

// ---------------------------------------------------------------------------
// POST /payments
// ---------------------------------------------------------------------------

/// Create a pending job and a checkout session for it.
///
/// The job's correlation token is embedded in the session metadata;
/// the payment webhook uses it to start generation once payment
/// succeeds.
pub async fn create_payment(
    State(state): State<AppState>,
    Json(input): Json<CreatePaymentRequest>,
) -> AppResult<impl IntoResponse> {
    input.customization.validate()?;

    if let Some(phone) = &input.phone_number {
        if !is_valid_phone_number(phone) {
            return Err(AppError::BadRequest("Invalid phone number".to_string()));
        }
    }

    let token = generate_job_token(input.customization.character_name.as_deref(), Utc::now());

    let job = JobRepo::create(
        &state.pool,
        &NewJob {
            token,
            customization: input.customization.clone(),
            phone_number: input.phone_number,
            sms_consent: input.sms_consent,
        },
    )
    .await?;

    ProgressRepo::initialize_steps(&state.pool, job.id).await?;

    let session = state
        .payments
        .create_checkout_session(&job.token, input.customization.character_name.as_deref())
        .await?;

    JobRepo::set_payment_session(&state.pool, job.id, &session.id).await?;

    tracing::info!(
        job_id = job.id,
        token = %job.token,
        session_id = %session.id,
        "Payment session created",
    );

    let response = PaymentCreatedResponse {
        job_token: job.token,
        session_id: session.id,
        checkout_url: session.url,
    };

    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}
