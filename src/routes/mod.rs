// HTTP routes

mod http;

use axum::{Router, routing::get, routing::post};
use std::sync::Arc;
use tokio::sync::Notify;
use tower_http::cors::{Any, CorsLayer};

use crate::approval_repo::ApprovalRepo;
use crate::config::AppConfig;
use crate::metrics_repo::MetricsRepo;
use crate::store::AggregationStore;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: Arc<AggregationStore>,
    pub(crate) metrics_repo: Arc<MetricsRepo>,
    pub(crate) approval_repo: Arc<ApprovalRepo>,
    pub(crate) refresh_notify: Arc<Notify>,
    pub(crate) config: AppConfig,
}

pub fn app(
    store: Arc<AggregationStore>,
    metrics_repo: Arc<MetricsRepo>,
    approval_repo: Arc<ApprovalRepo>,
    refresh_notify: Arc<Notify>,
    config: AppConfig,
) -> Router {
    let state = AppState {
        store,
        metrics_repo,
        approval_repo,
        refresh_notify,
        config,
    };
    Router::new()
        .route("/", get(|| async { "opsdeck: operations dashboard backend" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/info", get(http::api_info_handler)) // GET /api/info
        .route("/api/charts", get(http::charts_handler)) // GET /api/charts
        .route("/api/chart/{chart}", get(http::chart_handler)) // GET /api/chart/{chart}
        .route("/api/alerts", get(http::alerts_handler)) // GET /api/alerts
        .route("/api/series", get(http::series_list_handler)) // GET /api/series
        .route("/api/series/{name}", get(http::series_handler)) // GET /api/series/{name}
        .route("/api/series/{name}/geometry", get(http::geometry_handler)) // GET /api/series/{name}/geometry
        .route("/api/palette", get(http::palette_handler)) // GET /api/palette?q=
        .route("/api/pending-actions", get(http::pending_actions_handler)) // GET /api/pending-actions
        .route("/api/actions/{id}/approve", post(http::approve_handler)) // POST /api/actions/{id}/approve
        .route("/api/chat", post(http::chat_handler)) // POST /api/chat
        .route("/api/audit-log", get(http::audit_log_handler)) // GET /api/audit-log
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
