pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /payments                    create job + checkout session (POST)
/// /webhooks/payment            signed payment webhook (POST)
/// /progress/{token}            job + step progress polling (GET)
/// /downloads/{token}           completed-story ZIP bundle (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/payments", post(handlers::payments::create_payment))
        .route("/webhooks/payment", post(handlers::webhooks::payment_webhook))
        .route("/progress/{token}", get(handlers::progress::get_progress))
        .route("/downloads/{token}", get(handlers::downloads::download_bundle))
}
