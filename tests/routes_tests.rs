mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum_test::TestServer;
use common::{sample, spawn_stub};
use opsdeck::approval_repo::ApprovalRepo;
use opsdeck::config::AppConfig;
use opsdeck::metrics_repo::MetricsRepo;
use opsdeck::routes;
use opsdeck::store::AggregationStore;
use serde_json::{Value, json};
use tokio::sync::Notify;

fn config_for(metrics_base: &str, approvals_base: &str) -> AppConfig {
    AppConfig::load_from_str(&format!(
        r#"
[server]
port = 3001
host = "127.0.0.1"

[metrics]
base_url = "{metrics_base}"
request_timeout_ms = 2000
lookback_secs = 60
points = 60
window_capacity = 60

[approvals]
base_url = "{approvals_base}"
ws_url = "{approvals_base}/ws"
request_timeout_ms = 2000

[polling]
primary_interval_ms = 2000
processes_interval_ms = 5000
alerts_interval_ms = 10000
stats_log_interval_secs = 30
"#
    ))
    .unwrap()
}

struct TestApp {
    server: TestServer,
    store: Arc<AggregationStore>,
    approval_repo: Arc<ApprovalRepo>,
}

fn build(metrics_base: &str, approvals_base: &str) -> TestApp {
    let config = config_for(metrics_base, approvals_base);
    let store = Arc::new(AggregationStore::new());
    let metrics_repo = Arc::new(
        MetricsRepo::new(
            &config.metrics.base_url,
            Duration::from_millis(config.metrics.request_timeout_ms),
        )
        .unwrap(),
    );
    let approval_repo = Arc::new(
        ApprovalRepo::new(
            &config.approvals.base_url,
            Duration::from_millis(config.approvals.request_timeout_ms),
        )
        .unwrap(),
    );
    let app = routes::app(
        store.clone(),
        metrics_repo,
        approval_repo.clone(),
        Arc::new(Notify::new()),
        config,
    );
    TestApp {
        server: TestServer::new(app),
        store,
        approval_repo,
    }
}

// Unreachable bases for tests that never touch an upstream.
fn offline() -> TestApp {
    build("http://127.0.0.1:9", "http://127.0.0.1:9")
}

#[tokio::test]
async fn version_reports_crate_identity() {
    let app = offline();
    let response = app.server.get("/version").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["name"], "opsdeck");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn root_serves_banner() {
    let app = offline();
    let response = app.server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().contains("opsdeck"));
}

#[tokio::test]
async fn unknown_series_is_404() {
    let app = offline();
    app.server
        .get("/api/series/ghost")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    app.server
        .get("/api/series/ghost/geometry")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn series_snapshot_round_trips() {
    let app = offline();
    app.store.register("memory", 60);
    app.store
        .append(
            "memory",
            vec!["used".into(), "free".into()],
            vec![sample(1, &[10.0, 5.0]), sample(2, &[20.0, 5.0])],
        )
        .await;

    let body: Value = app.server.get("/api/series").await.json();
    assert_eq!(body["series"], json!(["memory"]));

    let response = app.server.get("/api/series/memory").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["labels"], json!(["used", "free"]));
    assert_eq!(body["samples"][0]["timestamp"], 1);
    assert_eq!(body["samples"][1]["values"], json!([20.0, 5.0]));
}

#[tokio::test]
async fn geometry_renders_registered_series() {
    let app = offline();
    app.store.register("memory", 60);
    app.store
        .append(
            "memory",
            vec!["used".into(), "free".into()],
            vec![sample(1, &[10.0, 5.0]), sample(2, &[20.0, 5.0])],
        )
        .await;

    let response = app.server.get("/api/series/memory/geometry").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["max_val"], 110.0);
    assert_eq!(body["gridlines"].as_array().unwrap().len(), 5);
    assert_eq!(
        body["series"][0]["polyline"].as_array().unwrap().len(),
        2
    );
}

#[tokio::test]
async fn chartless_series_has_no_geometry() {
    let app = offline();
    app.store.register("processes", 1);
    app.store
        .append(
            "processes",
            vec!["nginx".into()],
            vec![sample(1, &[12.0])],
        )
        .await;

    app.server
        .get("/api/series/processes")
        .await
        .assert_status_ok();
    app.server
        .get("/api/series/processes/geometry")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn palette_filters_and_expands() {
    let app = offline();
    let response = app
        .server
        .get("/api/palette")
        .add_query_param("q", "cpu")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    let entries = body["entries"].as_array().unwrap();
    assert_eq!(entries[0]["command"], "/cpu");
    assert_eq!(entries[0]["expandedQuery"], "What is my CPU usage?");
}

#[tokio::test]
async fn pending_actions_serve_the_cache() {
    let approval_app = Router::new().route(
        "/pending-actions",
        get(|| async {
            axum::Json(json!({
                "actions": [{
                    "id": "a1",
                    "action_type": "restart_service",
                    "target": "nginx",
                    "description": "restart",
                }]
            }))
        }),
    );
    let addr = spawn_stub(approval_app).await;
    let app = build("http://127.0.0.1:9", &format!("http://{addr}"));

    // Empty before the first refresh.
    let body: Value = app.server.get("/api/pending-actions").await.json();
    assert_eq!(body["actions"], json!([]));

    app.approval_repo.refresh_pending().await.unwrap();
    let body: Value = app.server.get("/api/pending-actions").await.json();
    assert_eq!(body["actions"][0]["id"], "a1");
    assert_eq!(body["actions"][0]["severity"], "MEDIUM");
}

#[tokio::test]
async fn approve_rejects_unknown_decision() {
    let app = offline();
    let response = app
        .server
        .post("/api/actions/a1/approve")
        .json(&json!({ "decision": "defer" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn approve_forwards_decision() {
    let approval_app = Router::new().route(
        "/actions/{id}/approve",
        post(|axum::Json(body): axum::Json<Value>| async move {
            assert_eq!(body["decision"], "reject");
            assert_eq!(body["approved_by"], "oncall");
            axum::Json(json!({ "status": "rejected", "message": "dismissed" }))
        }),
    );
    let addr = spawn_stub(approval_app).await;
    let app = build("http://127.0.0.1:9", &format!("http://{addr}"));

    let response = app
        .server
        .post("/api/actions/a1/approve")
        .json(&json!({ "decision": "reject", "approved_by": "oncall" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "dismissed");
}

#[tokio::test]
async fn upstream_failure_maps_to_bad_gateway() {
    let app = offline();
    let response = app.server.get("/api/charts").await;
    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn alerts_serve_placeholder_before_first_refresh() {
    let app = offline();
    let response = app.server.get("/api/alerts").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["criticalCount"], 0);
    assert!(body["hostname"].is_null());
    assert!(body["chartCount"].is_null());
}

#[tokio::test]
async fn chart_proxy_passes_data_through() {
    let metrics_app = Router::new().route(
        "/api/v1/data",
        get(|| async {
            axum::Json(json!({ "labels": ["time", "user"], "data": [[1, 2.0]] }))
        }),
    );
    let addr = spawn_stub(metrics_app).await;
    let app = build(&format!("http://{addr}"), "http://127.0.0.1:9");

    let response = app.server.get("/api/chart/system.cpu").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"][0][1], 2.0);
}
