// Alarm and host-identity models from the metrics source

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One active alarm as the upstream reports it. Unknown extra fields are
/// ignored; `status` is `"CRITICAL"` or some other upstream string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    pub name: String,
    #[serde(default)]
    pub chart: String,
    #[serde(default)]
    pub status: String,
}

impl Alarm {
    pub fn is_critical(&self) -> bool {
        self.status == "CRITICAL"
    }
}

/// Wire shape of the alarm-listing endpoint: `{ alarms: { id -> alarm } }`.
/// BTreeMap keeps iteration order stable across refreshes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlarmsPayload {
    #[serde(default)]
    pub alarms: BTreeMap<String, Alarm>,
}

/// Wire shape of the host-info endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostInfoPayload {
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub host: HostDetail,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostDetail {
    #[serde(default)]
    pub uptime_seconds: u64,
}

/// Best-effort aggregated status for the display surface. Fields stay at
/// their last good value when a refresh fails; `None` means the fetch has
/// never succeeded and the display shows a placeholder.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub alarms: Vec<(String, Alarm)>,
    pub critical_count: usize,
    pub hostname: Option<String>,
    pub uptime_secs: Option<u64>,
    pub chart_count: Option<usize>,
}
