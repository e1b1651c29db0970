// Approval backend adapter. Caches the latest pending-action set so the
// display always has something to show while the backend is unreachable.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::metrics_repo::SourceError;
use crate::models::{ChatReply, Decision, DecisionOutcome, PendingAction};

#[derive(Debug, serde::Deserialize)]
struct PendingPayload {
    #[serde(default)]
    actions: Vec<PendingAction>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

pub struct ApprovalRepo {
    client: reqwest::Client,
    base_url: String,
    pending: RwLock<Vec<PendingAction>>,
}

impl ApprovalRepo {
    pub fn new(base_url: &str, request_timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            pending: RwLock::new(Vec::new()),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T, SourceError> {
        let resp = self.client.get(&url).send().await?.error_for_status()?;
        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| SourceError::MalformedResponse(e.to_string()))
    }

    /// Fetches the pending set and replaces the cache. On failure the cache
    /// keeps its previous contents.
    pub async fn refresh_pending(&self) -> Result<usize, SourceError> {
        let url = format!("{}/pending-actions", self.base_url);
        let payload: PendingPayload = self.get_json(url).await?;
        let count = payload.actions.len();
        *self.pending.write().await = payload.actions;
        Ok(count)
    }

    pub async fn cached_pending(&self) -> Vec<PendingAction> {
        self.pending.read().await.clone()
    }

    /// Forwards an approve/reject decision for one action.
    pub async fn decide(
        &self,
        action_id: &str,
        decision: &str,
        approved_by: &str,
    ) -> Result<DecisionOutcome, SourceError> {
        let url = format!("{}/actions/{}/approve", self.base_url, action_id);
        let body = Decision {
            action_id: action_id.to_string(),
            decision: decision.to_string(),
            approved_by: approved_by.to_string(),
        };
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| SourceError::MalformedResponse(e.to_string()))
    }

    pub async fn chat(&self, message: &str) -> Result<ChatReply, SourceError> {
        let url = format!("{}/chat", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await?
            .error_for_status()?;
        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| SourceError::MalformedResponse(e.to_string()))
    }

    pub async fn audit_log(&self) -> Result<serde_json::Value, SourceError> {
        let url = format!("{}/audit-log", self.base_url);
        self.get_json(url).await
    }
}
