use anyhow::Result;
use opsdeck::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, watch};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let store = Arc::new(store::AggregationStore::new());
    let metrics_repo = Arc::new(metrics_repo::MetricsRepo::new(
        &app_config.metrics.base_url,
        Duration::from_millis(app_config.metrics.request_timeout_ms),
    )?);
    let approval_repo = Arc::new(approval_repo::ApprovalRepo::new(
        &app_config.approvals.base_url,
        Duration::from_millis(app_config.approvals.request_timeout_ms),
    )?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresh_notify = Arc::new(Notify::new());

    let scheduler_handles = scheduler::spawn(
        scheduler::SchedulerDeps {
            metrics_repo: metrics_repo.clone(),
            store: store.clone(),
            stats: Arc::new(scheduler::SchedulerStats::default()),
            shutdown_rx: shutdown_rx.clone(),
        },
        &app_config,
    );

    let (channel_state_tx, _channel_state_rx) = watch::channel(live::ChannelState::Disconnected);
    let live_handle = live::spawn(
        live::LiveChannelConfig {
            ws_url: app_config.approvals.ws_url.clone(),
            reconnect_delay: Duration::from_millis(app_config.approvals.reconnect_delay_ms),
        },
        refresh_notify.clone(),
        channel_state_tx,
        shutdown_rx.clone(),
    );
    let refresher_handle = live::spawn_refresher(
        approval_repo.clone(),
        refresh_notify.clone(),
        Duration::from_secs(app_config.approvals.refresh_interval_secs),
        shutdown_rx.clone(),
    );

    let app = routes::app(
        store,
        metrics_repo,
        approval_repo,
        refresh_notify,
        app_config.clone(),
    );
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(_) => {
                        let _ = tokio::signal::ctrl_c().await;
                        return;
                    }
                };
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            #[cfg(not(unix))]
            {
                let _ = tokio::signal::ctrl_c().await;
            }
        } => {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(true);
            for handle in scheduler_handles {
                let _ = handle.await;
            }
            let _ = live_handle.await;
            let _ = refresher_handle.await;
        }
    }

    Ok(())
}
