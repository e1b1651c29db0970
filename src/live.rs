// Push channel client: long-lived WebSocket to the approval backend.
// Events trigger a debounced re-fetch of pending actions; the channel going
// away degrades to the polling backstop, never crashes anything.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::approval_repo::ApprovalRepo;
use crate::models::LiveEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone)]
pub struct LiveChannelConfig {
    pub ws_url: String,
    /// Fixed (non-exponential) delay between reconnect attempts. Attempts
    /// are unbounded; this is a long-lived operator dashboard.
    pub reconnect_delay: Duration,
}

/// Decodes one push frame. Malformed payloads are dropped with a warning.
pub fn parse_frame(text: &str) -> Option<LiveEvent> {
    match serde_json::from_str::<LiveEvent>(text) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, "dropping malformed push frame");
            None
        }
    }
}

/// Runs the connect/read/reconnect state machine. Every decoded event wakes
/// the refresher via `notify`; `state_tx` exposes the current channel state.
pub fn spawn(
    config: LiveChannelConfig,
    notify: Arc<Notify>,
    state_tx: watch::Sender<ChannelState>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let _ = state_tx.send(ChannelState::Connecting);
            match connect_async(&config.ws_url).await {
                Ok((mut ws, _)) => {
                    let _ = state_tx.send(ChannelState::Connected);
                    info!(url = %config.ws_url, "push channel connected");
                    loop {
                        tokio::select! {
                            msg = ws.next() => match msg {
                                Some(Ok(Message::Text(text))) => {
                                    if let Some(event) = parse_frame(&text) {
                                        match event {
                                            LiveEvent::PendingAction { action } => {
                                                debug!(action_id = %action.id, "pending action pushed");
                                            }
                                            LiveEvent::ActionResolved { action_id } => {
                                                debug!(action_id = %action_id, "action resolved");
                                            }
                                        }
                                        // Both tags refresh the same series.
                                        notify.notify_one();
                                    }
                                }
                                Some(Ok(_)) => {}
                                Some(Err(e)) => {
                                    warn!(error = %e, "push channel read error");
                                    break;
                                }
                                None => break,
                            },
                            _ = shutdown_rx.changed() => {
                                let _ = ws.close(None).await;
                                let _ = state_tx.send(ChannelState::Disconnected);
                                return;
                            }
                        }
                    }
                    // The old connection is dropped here, before any
                    // reconnect attempt creates a new one.
                    let _ = ws.close(None).await;
                    let _ = state_tx.send(ChannelState::Disconnected);
                    info!("push channel disconnected");
                }
                Err(e) => {
                    let _ = state_tx.send(ChannelState::Disconnected);
                    warn!(error = %e, "push channel connect failed");
                }
            }
            tokio::select! {
                _ = sleep(config.reconnect_delay) => {}
                _ = shutdown_rx.changed() => break,
            }
        }
        debug!("push channel loop shutting down");
    })
}

/// Single consumer of refresh triggers: push events and the interval
/// backstop both land here, so at most one pending-actions fetch is ever in
/// flight and a burst of events collapses into one wake.
pub fn spawn_refresher(
    approval_repo: Arc<ApprovalRepo>,
    notify: Arc<Notify>,
    refresh_interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = interval(refresh_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = notify.notified() => {}
                _ = tick.tick() => {}
                _ = shutdown_rx.changed() => break,
            }
            match approval_repo.refresh_pending().await {
                Ok(count) => debug!(pending = count, "pending actions refreshed"),
                Err(e) => warn!(
                    error = %e,
                    operation = "refresh_pending",
                    "pending refresh failed, keeping cached set"
                ),
            }
        }
        debug!("refresher shutting down");
    })
}
