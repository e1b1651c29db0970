// Metrics source adapter: one upstream "chart" query -> timestamped samples.
// Retry policy lives in the scheduler, not here.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::warn;

use crate::models::{AlarmsPayload, HostInfoPayload, Sample, StatusSnapshot};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SourceError::MalformedResponse(e.to_string())
        } else {
            // Timeouts, refused connections and upstream non-2xx all degrade
            // the same way: keep the last good window contents.
            SourceError::UpstreamUnavailable(e.to_string())
        }
    }
}

/// Parameters of one chart data request: chart identifier, lookback window
/// (negative seconds, upstream convention) and requested point count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartQuery {
    pub chart: String,
    pub after: i64,
    pub points: u32,
}

impl ChartQuery {
    pub fn new(chart: impl Into<String>, after: i64, points: u32) -> Self {
        Self {
            chart: chart.into(),
            after,
            points,
        }
    }
}

/// Decoded chart data: channel labels (time column stripped) plus samples in
/// chronological order.
#[derive(Debug, Clone, Default)]
pub struct ChartSlice {
    pub labels: Vec<String>,
    pub samples: Vec<Sample>,
}

/// Seam between the scheduler and whatever serves chart data, so poll logic
/// is testable against an in-memory source.
pub trait MetricSource: Send + Sync {
    fn fetch(
        &self,
        query: &ChartQuery,
    ) -> impl Future<Output = Result<ChartSlice, SourceError>> + Send;
}

/// Wire shape of the data endpoint: `labels` names the time column plus one
/// entry per channel, each row is `[timestamp, ch0, ch1, ...]` newest first.
#[derive(Debug, Deserialize)]
struct ChartPayload {
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    data: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartCatalogPayload {
    #[serde(default)]
    charts: serde_json::Map<String, serde_json::Value>,
}

pub struct MetricsRepo {
    client: reqwest::Client,
    base_url: String,
    status: RwLock<StatusSnapshot>,
}

impl MetricsRepo {
    pub fn new(base_url: &str, request_timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            status: RwLock::new(StatusSnapshot::default()),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T, SourceError> {
        let resp = self.client.get(&url).send().await?.error_for_status()?;
        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| SourceError::MalformedResponse(e.to_string()))
    }

    /// Fetches one chart and converts rows to samples. Upstream rows arrive
    /// newest first; the slice is reversed so windows stay chronological.
    pub async fn fetch_chart(&self, query: &ChartQuery) -> Result<ChartSlice, SourceError> {
        let url = format!(
            "{}/api/v1/data?chart={}&after={}&points={}&format=json",
            self.base_url, query.chart, query.after, query.points
        );
        let payload: ChartPayload = self.get_json(url).await?;

        let mut samples = Vec::with_capacity(payload.data.len());
        for row in &payload.data {
            if row.len() < 2 {
                return Err(SourceError::MalformedResponse(format!(
                    "chart {} row has {} entries, expected timestamp plus channels",
                    query.chart,
                    row.len()
                )));
            }
            samples.push(Sample::new(row[0] as u64, row[1..].to_vec()));
        }
        samples.reverse();

        let labels = payload.labels.iter().skip(1).cloned().collect();
        Ok(ChartSlice { labels, samples })
    }

    pub async fn chart_count(&self) -> Result<usize, SourceError> {
        let url = format!("{}/api/v1/charts", self.base_url);
        let payload: ChartCatalogPayload = self.get_json(url).await?;
        Ok(payload.charts.len())
    }

    pub async fn active_alarms(&self) -> Result<AlarmsPayload, SourceError> {
        let url = format!("{}/api/v1/alarms?active", self.base_url);
        self.get_json(url).await
    }

    pub async fn host_info(&self) -> Result<HostInfoPayload, SourceError> {
        let url = format!("{}/api/v1/info", self.base_url);
        self.get_json(url).await
    }

    /// Raw proxy fetch for the display surface; no decoding beyond JSON.
    pub async fn fetch_chart_raw(
        &self,
        query: &ChartQuery,
    ) -> Result<serde_json::Value, SourceError> {
        let url = format!(
            "{}/api/v1/data?chart={}&after={}&points={}&format=json",
            self.base_url, query.chart, query.after, query.points
        );
        self.get_json(url).await
    }

    /// Refreshes the cached status snapshot. Each part keeps its last good
    /// value on failure; the first error is reported so the scheduler can
    /// track task health.
    pub async fn refresh_status(&self) -> Result<(), SourceError> {
        let mut first_err: Option<SourceError> = None;

        match self.active_alarms().await {
            Ok(payload) => {
                let mut status = self.status.write().await;
                status.critical_count = payload.alarms.values().filter(|a| a.is_critical()).count();
                status.alarms = payload.alarms.into_iter().collect();
            }
            Err(e) => first_err = Some(e),
        }
        match self.host_info().await {
            Ok(info) => {
                let mut status = self.status.write().await;
                status.hostname = Some(info.hostname);
                status.uptime_secs = Some(info.host.uptime_seconds);
            }
            Err(e) => {
                warn!(error = %e, operation = "host_info", "host info refresh failed");
                first_err = first_err.or(Some(e));
            }
        }
        match self.chart_count().await {
            Ok(count) => self.status.write().await.chart_count = Some(count),
            Err(e) => {
                warn!(error = %e, operation = "chart_count", "chart catalog refresh failed");
                first_err = first_err.or(Some(e));
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub async fn status(&self) -> StatusSnapshot {
        self.status.read().await.clone()
    }
}

impl MetricSource for MetricsRepo {
    async fn fetch(&self, query: &ChartQuery) -> Result<ChartSlice, SourceError> {
        self.fetch_chart(query).await
    }
}
