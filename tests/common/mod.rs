// Shared test helpers
#![allow(dead_code)]

use std::collections::VecDeque;

use opsdeck::metrics_repo::{ChartQuery, ChartSlice, MetricSource, SourceError};
use opsdeck::models::Sample;
use tokio::sync::Mutex;

pub fn sample(timestamp: u64, values: &[f64]) -> Sample {
    Sample::new(timestamp, values.to_vec())
}

pub fn slice(labels: &[&str], rows: &[(u64, &[f64])]) -> ChartSlice {
    ChartSlice {
        labels: labels.iter().map(|s| s.to_string()).collect(),
        samples: rows.iter().map(|(t, v)| sample(*t, v)).collect(),
    }
}

/// In-memory metric source: pops one scripted response per fetch; once the
/// script is exhausted every fetch fails as unavailable.
pub struct MockSource {
    responses: Mutex<VecDeque<Result<ChartSlice, SourceError>>>,
}

impl MockSource {
    pub fn new(responses: Vec<Result<ChartSlice, SourceError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

impl MetricSource for MockSource {
    async fn fetch(&self, _query: &ChartQuery) -> Result<ChartSlice, SourceError> {
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(SourceError::UpstreamUnavailable("script exhausted".into())))
    }
}

/// Serves an axum router on an ephemeral loopback port for the lifetime of
/// the test process. Returns the bound address, e.g. `127.0.0.1:41234`.
pub async fn spawn_stub(app: axum::Router) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}
