use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub metrics: MetricsConfig,
    pub approvals: ApprovalsConfig,
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

/// Upstream metrics source (HTTP JSON chart API).
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
    /// Lookback window in seconds for chart queries (sent negated upstream).
    pub lookback_secs: u32,
    /// Points requested per chart query.
    pub points: u32,
    /// Rolling-window capacity per series.
    pub window_capacity: usize,
}

/// Approval backend: HTTP endpoints plus the push channel.
#[derive(Debug, Clone, Deserialize)]
pub struct ApprovalsConfig {
    pub base_url: String,
    pub ws_url: String,
    pub request_timeout_ms: u64,
    /// Fixed delay before each push-channel reconnect attempt.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Polling backstop for pending actions when the push channel is down.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

fn default_reconnect_delay_ms() -> u64 {
    3000
}

fn default_refresh_interval_secs() -> u64 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Cadence for the primary metric series (cpu/memory/network/disk/load).
    pub primary_interval_ms: u64,
    /// Cadence for the per-process usage table.
    pub processes_interval_ms: u64,
    /// Cadence for alarm/host/catalog status refresh.
    pub alerts_interval_ms: u64,
    /// How often to log app stats (tick/failure totals) at INFO level.
    pub stats_log_interval_secs: u64,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.metrics.base_url.is_empty(),
            "metrics.base_url must be non-empty"
        );
        anyhow::ensure!(
            self.metrics.request_timeout_ms > 0,
            "metrics.request_timeout_ms must be > 0, got {}",
            self.metrics.request_timeout_ms
        );
        anyhow::ensure!(
            self.metrics.lookback_secs > 0,
            "metrics.lookback_secs must be > 0, got {}",
            self.metrics.lookback_secs
        );
        anyhow::ensure!(
            self.metrics.points > 0,
            "metrics.points must be > 0, got {}",
            self.metrics.points
        );
        anyhow::ensure!(
            self.metrics.window_capacity > 0,
            "metrics.window_capacity must be > 0, got {}",
            self.metrics.window_capacity
        );
        anyhow::ensure!(
            !self.approvals.base_url.is_empty(),
            "approvals.base_url must be non-empty"
        );
        anyhow::ensure!(
            !self.approvals.ws_url.is_empty(),
            "approvals.ws_url must be non-empty"
        );
        anyhow::ensure!(
            self.approvals.request_timeout_ms > 0,
            "approvals.request_timeout_ms must be > 0, got {}",
            self.approvals.request_timeout_ms
        );
        anyhow::ensure!(
            self.approvals.reconnect_delay_ms > 0,
            "approvals.reconnect_delay_ms must be > 0, got {}",
            self.approvals.reconnect_delay_ms
        );
        anyhow::ensure!(
            self.approvals.refresh_interval_secs > 0,
            "approvals.refresh_interval_secs must be > 0, got {}",
            self.approvals.refresh_interval_secs
        );
        anyhow::ensure!(
            self.polling.primary_interval_ms > 0,
            "polling.primary_interval_ms must be > 0, got {}",
            self.polling.primary_interval_ms
        );
        anyhow::ensure!(
            self.polling.processes_interval_ms > 0,
            "polling.processes_interval_ms must be > 0, got {}",
            self.polling.processes_interval_ms
        );
        anyhow::ensure!(
            self.polling.alerts_interval_ms > 0,
            "polling.alerts_interval_ms must be > 0, got {}",
            self.polling.alerts_interval_ms
        );
        anyhow::ensure!(
            self.polling.stats_log_interval_secs > 0,
            "polling.stats_log_interval_secs must be > 0, got {}",
            self.polling.stats_log_interval_secs
        );
        Ok(())
    }
}
