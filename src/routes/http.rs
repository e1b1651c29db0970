// Handlers: proxy endpoints, aggregated series/geometry, approval workflow.
// Upstream failures surface as a JSON error payload with a non-2xx status;
// they never crash the process.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use super::AppState;
use crate::chart::{self, ChartLayout};
use crate::metrics_repo::{ChartQuery, SourceError};
use crate::palette;
use crate::version::{NAME, VERSION};

fn upstream_error(e: SourceError) -> (StatusCode, axum::Json<serde_json::Value>) {
    (
        StatusCode::BAD_GATEWAY,
        axum::Json(serde_json::json!({ "error": e.to_string() })),
    )
}

fn not_found(what: &str) -> (StatusCode, axum::Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        axum::Json(serde_json::json!({ "error": format!("unknown {what}") })),
    )
}

/// GET /version - service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/info - proxied host identity from the metrics source.
pub(super) async fn api_info_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics_repo.host_info().await {
        Ok(info) => axum::Json(serde_json::json!({
            "hostname": info.hostname,
            "host": { "uptime_seconds": info.host.uptime_seconds },
        }))
        .into_response(),
        Err(e) => upstream_error(e).into_response(),
    }
}

/// GET /api/charts - size of the upstream chart catalog.
pub(super) async fn charts_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics_repo.chart_count().await {
        Ok(count) => axum::Json(serde_json::json!({ "count": count })).into_response(),
        Err(e) => upstream_error(e).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ChartParams {
    after: Option<i64>,
    points: Option<u32>,
}

/// GET /api/chart/{chart} - raw proxied chart data for the display surface.
pub(super) async fn chart_handler(
    Path(chart): Path<String>,
    Query(params): Query<ChartParams>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let query = ChartQuery::new(
        chart,
        params.after.unwrap_or(-60),
        params.points.unwrap_or(60),
    );
    match state.metrics_repo.fetch_chart_raw(&query).await {
        Ok(value) => axum::Json(value).into_response(),
        Err(e) => upstream_error(e).into_response(),
    }
}

/// GET /api/alerts - cached alarm state plus counts. Stale but present when
/// the upstream is down; nulls before the first successful refresh.
pub(super) async fn alerts_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(state.metrics_repo.status().await)
}

/// GET /api/series - registered series names.
pub(super) async fn series_list_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::Json(serde_json::json!({ "series": state.store.series_names() }))
}

/// GET /api/series/{name} - window snapshot (labels + samples, oldest first).
pub(super) async fn series_handler(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let Some(samples) = state.store.snapshot(&name).await else {
        return not_found("series").into_response();
    };
    let labels = state.store.labels(&name).await.unwrap_or_default();
    axum::Json(serde_json::json!({ "labels": labels, "samples": samples })).into_response()
}

/// GET /api/series/{name}/geometry - rendered chart geometry for one series.
pub(super) async fn geometry_handler(
    Path(name): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let Some(samples) = state.store.snapshot(&name).await else {
        return not_found("series").into_response();
    };
    let labels = state.store.labels(&name).await.unwrap_or_default();
    let capacity = state
        .store
        .capacity(&name)
        .await
        .unwrap_or(state.config.metrics.window_capacity);
    let Some(spec) = chart::spec_for(&name, &labels, &samples, capacity) else {
        return not_found("chart").into_response();
    };
    let geometry = chart::render(&spec, &ChartLayout::default());
    axum::Json(geometry).into_response()
}

#[derive(Debug, Deserialize)]
pub(super) struct PaletteParams {
    #[serde(default)]
    q: String,
}

/// GET /api/palette?q= - quick-action suggestions for the input surface.
pub(super) async fn palette_handler(Query(params): Query<PaletteParams>) -> impl IntoResponse {
    let entries: Vec<serde_json::Value> = palette::matches(&params.q)
        .into_iter()
        .map(|e| {
            serde_json::json!({
                "command": e.command,
                "description": e.description,
                "expandedQuery": e.expanded_query,
            })
        })
        .collect();
    axum::Json(serde_json::json!({ "entries": entries }))
}

/// GET /api/pending-actions - cached pending set (refreshed by push events
/// and the polling backstop).
pub(super) async fn pending_actions_handler(State(state): State<AppState>) -> impl IntoResponse {
    let actions = state.approval_repo.cached_pending().await;
    axum::Json(serde_json::json!({ "actions": actions }))
}

#[derive(Debug, Deserialize)]
pub(super) struct ApproveBody {
    decision: String,
    #[serde(default = "default_approved_by")]
    approved_by: String,
}

fn default_approved_by() -> String {
    "operator".into()
}

/// POST /api/actions/{id}/approve - forward the decision, then wake the
/// refresher so the cached pending set converges quickly.
pub(super) async fn approve_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    axum::Json(body): axum::Json<ApproveBody>,
) -> impl IntoResponse {
    if body.decision != "approve" && body.decision != "reject" {
        return (
            StatusCode::BAD_REQUEST,
            axum::Json(serde_json::json!({ "error": "decision must be approve or reject" })),
        )
            .into_response();
    }
    match state
        .approval_repo
        .decide(&id, &body.decision, &body.approved_by)
        .await
    {
        Ok(outcome) => {
            state.refresh_notify.notify_one();
            axum::Json(outcome).into_response()
        }
        Err(e) => upstream_error(e).into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatBody {
    message: String,
}

/// POST /api/chat - free-text chat proxied to the approval backend.
pub(super) async fn chat_handler(
    State(state): State<AppState>,
    axum::Json(body): axum::Json<ChatBody>,
) -> impl IntoResponse {
    match state.approval_repo.chat(&body.message).await {
        Ok(reply) => axum::Json(reply).into_response(),
        Err(e) => upstream_error(e).into_response(),
    }
}

/// GET /api/audit-log - proxied audit trail.
pub(super) async fn audit_log_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.approval_repo.audit_log().await {
        Ok(logs) => axum::Json(logs).into_response(),
        Err(e) => upstream_error(e).into_response(),
    }
}
