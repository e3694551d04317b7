use crate::SyncError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use trellis_core::{BoardItem, BoardSnapshot, ExternalLabel, ItemStatus, LabelKind};

#[derive(Clone, Serialize, Deserialize)]
pub struct BoardSettings {
    pub endpoint: String,
    pub access_token: Option<String>,
}

impl std::fmt::Debug for BoardSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardSettings")
            .field("endpoint", &self.endpoint)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

#[async_trait]
pub trait BoardBackend: Send + Sync {
    async fn fetch_board(
        &self,
        settings: &BoardSettings,
        label: &str,
    ) -> Result<BoardSnapshot, SyncError>;

    async fn update_status(
        &self,
        settings: &BoardSettings,
        item_id: &str,
        status: ItemStatus,
    ) -> Result<(), SyncError>;

    async fn snooze_item(
        &self,
        settings: &BoardSettings,
        item_id: &str,
        until: DateTime<Utc>,
    ) -> Result<(), SyncError>;

    async fn summarize_item(
        &self,
        settings: &BoardSettings,
        item_id: &str,
    ) -> Result<String, SyncError>;

    async fn list_labels(&self, settings: &BoardSettings) -> Result<Vec<ExternalLabel>, SyncError>;
}

/// JSON client for the Trellis board service.
#[derive(Debug, Default)]
pub struct HttpBoardBackend {
    http: reqwest::Client,
}

impl HttpBoardBackend {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BoardResponse {
    columns: Option<HashMap<String, Vec<BoardItemPayload>>>,
}

#[derive(Debug, Deserialize)]
struct BoardItemPayload {
    id: Option<String>,
    #[serde(rename = "senderName")]
    sender_name: Option<String>,
    #[serde(rename = "senderEmail")]
    sender_email: Option<String>,
    subject: Option<String>,
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LabelListResponse {
    labels: Option<Vec<LabelPayload>>,
}

#[derive(Debug, Deserialize)]
struct LabelPayload {
    id: Option<String>,
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[async_trait]
impl BoardBackend for HttpBoardBackend {
    async fn fetch_board(
        &self,
        settings: &BoardSettings,
        label: &str,
    ) -> Result<BoardSnapshot, SyncError> {
        let mut request = self.http.get(format!(
            "{}/boards/{label}",
            settings.endpoint.trim_end_matches('/')
        ));
        if let Some(token) = &settings.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(SyncError::Data(format!(
                "board fetch failed with status {}",
                response.status()
            )));
        }

        let payload: BoardResponse = response.json().await?;
        Ok(snapshot_from_columns(payload.columns.unwrap_or_default()))
    }

    async fn update_status(
        &self,
        settings: &BoardSettings,
        item_id: &str,
        status: ItemStatus,
    ) -> Result<(), SyncError> {
        let mut request = self
            .http
            .post(format!(
                "{}/items/{item_id}/status",
                settings.endpoint.trim_end_matches('/')
            ))
            .json(&serde_json::json!({ "status": status.as_str() }));
        if let Some(token) = &settings.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(SyncError::Data(format!(
                "status update failed with status {}",
                response.status()
            )));
        }

        Ok(())
    }

    async fn snooze_item(
        &self,
        settings: &BoardSettings,
        item_id: &str,
        until: DateTime<Utc>,
    ) -> Result<(), SyncError> {
        let mut request = self
            .http
            .post(format!(
                "{}/items/{item_id}/snooze",
                settings.endpoint.trim_end_matches('/')
            ))
            .json(&serde_json::json!({ "until": until.to_rfc3339() }));
        if let Some(token) = &settings.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(SyncError::Data(format!(
                "snooze failed with status {}",
                response.status()
            )));
        }

        Ok(())
    }

    async fn summarize_item(
        &self,
        settings: &BoardSettings,
        item_id: &str,
    ) -> Result<String, SyncError> {
        let mut request = self.http.post(format!(
            "{}/items/{item_id}/summarize",
            settings.endpoint.trim_end_matches('/')
        ));
        if let Some(token) = &settings.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(SyncError::Data(format!(
                "summarize failed with status {}",
                response.status()
            )));
        }

        let payload: SummaryResponse = response.json().await?;
        let summary = payload.summary.unwrap_or_default();
        if summary.trim().is_empty() {
            return Err(SyncError::Data(
                "summarize returned an empty summary".to_string(),
            ));
        }

        Ok(summary)
    }

    async fn list_labels(&self, settings: &BoardSettings) -> Result<Vec<ExternalLabel>, SyncError> {
        let mut request = self.http.get(format!(
            "{}/labels",
            settings.endpoint.trim_end_matches('/')
        ));
        if let Some(token) = &settings.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(SyncError::Data(format!(
                "label fetch failed with status {}",
                response.status()
            )));
        }

        let payload: LabelListResponse = response.json().await?;
        Ok(labels_from_payload(payload.labels.unwrap_or_default()))
    }
}

fn snapshot_from_columns(columns: HashMap<String, Vec<BoardItemPayload>>) -> BoardSnapshot {
    let mut snapshot = BoardSnapshot::default();
    for (column, items) in columns {
        let Ok(status) = column.parse::<ItemStatus>() else {
            tracing::warn!("skipping unknown board column `{column}`");
            continue;
        };

        for item in items {
            let Some(id) = item.id else {
                continue;
            };

            snapshot.push_item(BoardItem {
                id,
                sender_name: item.sender_name.unwrap_or_default(),
                sender_email: item.sender_email.unwrap_or_default(),
                subject: item.subject.unwrap_or_else(|| "(No subject)".to_string()),
                summary: item.summary,
                status,
            });
        }
    }

    snapshot
}

fn labels_from_payload(labels: Vec<LabelPayload>) -> Vec<ExternalLabel> {
    let mut out = Vec::new();
    for label in labels {
        let (Some(id), Some(name)) = (label.id, label.name) else {
            continue;
        };

        let kind = match label.kind.as_deref() {
            Some("system") => LabelKind::System,
            _ => LabelKind::User,
        };
        out.push(ExternalLabel { id, name, kind });
    }

    out
}
