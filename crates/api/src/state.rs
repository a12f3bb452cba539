use std::sync::Arc;

use drowse_clients::ObjectStore;
use drowse_notify::Notifier;
use drowse_pipeline::JobOrchestrator;

use crate::config::ServerConfig;
use crate::payments::PaymentProvider;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: drowse_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Generation pipeline entry point.
    pub orchestrator: Arc<JobOrchestrator>,
    /// SMS notification dispatch (best-effort).
    pub notifier: Arc<dyn Notifier>,
    /// Payment provider client.
    pub payments: Arc<dyn PaymentProvider>,
    /// Asset storage, used by the download bundler to fetch media.
    pub assets: Arc<dyn ObjectStore>,
}
