// Approval-workflow models and push-channel events

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// An action proposed by the approval backend, awaiting an operator
/// decision. Created upstream; this process only caches the latest fetched
/// set and forwards decisions, it never mutates actions directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAction {
    pub id: String,
    pub action_type: String,
    pub target: String,
    #[serde(default = "default_severity")]
    pub severity: Severity,
    pub description: String,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default)]
    pub rollback_plan: Option<String>,
}

fn default_severity() -> Severity {
    Severity::Medium
}

/// One decoded frame from the push channel. Transient: events trigger a
/// targeted re-fetch of pending actions, they are never stored themselves.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    PendingAction { action: PendingAction },
    ActionResolved { action_id: String },
}

/// Body for POST /actions/{id}/approve on the approval backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub action_id: String,
    pub decision: String,
    pub approved_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionOutcome {
    #[serde(default)]
    pub status: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub tools_used: Option<Vec<String>>,
}
