use crate::{BoardBackend, BoardSettings, SyncError};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{RwLock, Semaphore};
use trellis_board::BoardCache;
use trellis_core::{BoardSnapshot, ExternalLabel, ItemStatus};
use uuid::Uuid;

/// Maximum summary-less items picked up per board refresh.
const SUMMARY_BATCH_LIMIT: usize = 12;

/// Maximum concurrent summarize calls against the remote service.
const MAX_CONCURRENT_SUMMARIES: usize = 3;

/// How long transient failure notices stay visible.
const NOTICE_TTL_MS: i64 = 2_000;

/// Short-lived failure banner shown after a mutation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: Uuid,
    pub message: String,
    pub posted_at: DateTime<Utc>,
}

impl Notice {
    /// Whether the display window for this notice has passed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.posted_at >= Duration::milliseconds(NOTICE_TTL_MS)
    }
}

#[derive(Debug, Default)]
struct ViewState {
    active_label: Option<String>,
    cache: BoardCache,
    pending_updates: HashSet<String>,
    pending_summaries: HashSet<String>,
    requested_summaries: HashSet<String>,
    notices: Vec<Notice>,
}

impl ViewState {
    fn push_notice(&mut self, message: &str) {
        let now = Utc::now();
        self.notices.retain(|notice| !notice.is_expired(now));
        self.notices.push(Notice {
            id: Uuid::new_v4(),
            message: message.to_string(),
            posted_at: now,
        });
    }

    /// Next summary-less items of `label`'s board, bounded per evaluation
    /// and deduplicated against the session's requested set. Picked items
    /// are marked requested and pending before this returns.
    fn queue_candidates(&mut self, label: &str) -> Vec<String> {
        let candidates: Vec<String> = match self.cache.get(label) {
            Some(snapshot) => snapshot
                .items()
                .filter(|item| item.summary.is_none())
                .take(SUMMARY_BATCH_LIMIT)
                .map(|item| item.id.clone())
                .collect(),
            None => return Vec::new(),
        };

        let mut to_request = Vec::new();
        for item_id in candidates {
            if self.requested_summaries.insert(item_id.clone()) {
                self.pending_summaries.insert(item_id.clone());
                to_request.push(item_id);
            }
        }

        to_request
    }
}

#[derive(Clone)]
pub struct BoardService {
    backend: Arc<dyn BoardBackend>,
    settings: BoardSettings,
    state: Arc<RwLock<ViewState>>,
    summary_permits: Arc<Semaphore>,
}

impl BoardService {
    pub fn new(backend: Arc<dyn BoardBackend>, settings: BoardSettings) -> Self {
        Self {
            backend,
            settings,
            state: Arc::new(RwLock::new(ViewState::default())),
            summary_permits: Arc::new(Semaphore::new(MAX_CONCURRENT_SUMMARIES)),
        }
    }

    /// Switch the board to another mailbox label and load it.
    pub async fn select_mailbox(&self, label: &str) -> Result<(), SyncError> {
        {
            let mut state = self.state.write().await;
            state.active_label = Some(label.to_string());
            state.pending_updates.clear();
            state.pending_summaries.clear();
            state.requested_summaries.clear();
            state.notices.clear();
        }

        self.refresh().await
    }

    pub async fn refresh(&self) -> Result<(), SyncError> {
        let Some(label) = self.active_label().await else {
            return Ok(());
        };

        let snapshot = self.backend.fetch_board(&self.settings, &label).await?;
        {
            let mut state = self.state.write().await;
            state.cache.replace(&label, snapshot);
        }

        self.schedule_summaries().await;
        Ok(())
    }

    /// Move an item to a new column, rolling back if the remote update fails.
    pub async fn move_item(&self, item_id: &str, target: ItemStatus) -> Result<(), SyncError> {
        let Some((label, previous)) = self.begin_move(item_id, target).await else {
            return Ok(());
        };

        let result = self
            .backend
            .update_status(&self.settings, item_id, target)
            .await;

        {
            let mut state = self.state.write().await;
            if let Err(error) = &result {
                tracing::warn!("status update for {item_id} failed: {error}");
                state.cache.replace(&label, previous);
                state.push_notice("Update failed");
            }
            state.pending_updates.remove(item_id);
        }

        if let Err(error) = self.refresh().await {
            tracing::warn!("refresh after move failed: {error}");
        }

        result
    }

    pub async fn snooze_item(
        &self,
        item_id: &str,
        until: DateTime<Utc>,
    ) -> Result<(), SyncError> {
        if self.begin_snooze(item_id).await.is_none() {
            return Ok(());
        }

        let result = self
            .backend
            .snooze_item(&self.settings, item_id, until)
            .await;

        {
            let mut state = self.state.write().await;
            if let Err(error) = &result {
                tracing::warn!("snooze for {item_id} failed: {error}");
                state.push_notice("Snooze failed");
            }
            state.pending_updates.remove(item_id);
        }

        if let Err(error) = self.refresh().await {
            tracing::warn!("refresh after snooze failed: {error}");
        }

        result
    }

    pub async fn list_labels(&self) -> Result<Vec<ExternalLabel>, SyncError> {
        self.backend.list_labels(&self.settings).await
    }

    pub async fn active_label(&self) -> Option<String> {
        self.state.read().await.active_label.clone()
    }

    /// Cloned snapshot of the active board, or `None` before the first load.
    pub async fn snapshot(&self) -> Option<BoardSnapshot> {
        let state = self.state.read().await;
        let label = state.active_label.as_deref()?;
        state.cache.snapshot(label)
    }

    pub async fn is_pending(&self, item_id: &str) -> bool {
        self.state.read().await.pending_updates.contains(item_id)
    }

    pub async fn is_summarizing(&self, item_id: &str) -> bool {
        self.state.read().await.pending_summaries.contains(item_id)
    }

    pub async fn has_pending_summaries(&self) -> bool {
        !self.state.read().await.pending_summaries.is_empty()
    }

    pub async fn notices(&self) -> Vec<Notice> {
        let now = Utc::now();
        self.state
            .read()
            .await
            .notices
            .iter()
            .filter(|notice| !notice.is_expired(now))
            .cloned()
            .collect()
    }

    /// Marks the item pending, captures the rollback snapshot and applies the
    /// optimistic patch, all under one lock so no reader sees a half step.
    async fn begin_move(
        &self,
        item_id: &str,
        target: ItemStatus,
    ) -> Option<(String, BoardSnapshot)> {
        let mut state = self.state.write().await;
        let label = state.active_label.clone()?;
        let previous = state.cache.snapshot(&label)?;
        if !previous.contains(item_id) {
            return None;
        }

        state.pending_updates.insert(item_id.to_string());
        state.cache.patch_move(&label, item_id, target);
        Some((label, previous))
    }

    async fn begin_snooze(&self, item_id: &str) -> Option<String> {
        let mut state = self.state.write().await;
        let label = state.active_label.clone()?;
        if !state.cache.get(&label)?.contains(item_id) {
            return None;
        }

        state.pending_updates.insert(item_id.to_string());
        Some(label)
    }

    /// Queue summarization for visible items that still lack a summary.
    async fn schedule_summaries(&self) {
        let (label, to_request) = {
            let mut state = self.state.write().await;
            let Some(label) = state.active_label.clone() else {
                return;
            };
            let to_request = state.queue_candidates(&label);
            (label, to_request)
        };

        self.spawn_summaries(&label, to_request);
    }

    fn spawn_summaries(&self, label: &str, to_request: Vec<String>) {
        for item_id in to_request {
            let service = self.clone();
            let label = label.to_string();
            tokio::spawn(async move {
                service.run_summary(&label, &item_id).await;
            });
        }
    }

    async fn run_summary(&self, label: &str, item_id: &str) {
        let _permit = self.summary_permits.clone().acquire_owned().await.ok();

        let result = self.backend.summarize_item(&self.settings, item_id).await;

        let mut state = self.state.write().await;
        let landed = match result {
            Ok(summary) => {
                state.cache.patch_summary(label, item_id, &summary);
                true
            }
            Err(error) => {
                tracing::debug!("summarize for {item_id} failed: {error}");
                false
            }
        };
        state.pending_summaries.remove(item_id);

        if !landed {
            return;
        }

        // A landed summary is itself a snapshot change; pick up the next
        // candidates under the same guard so the backfill never reads
        // drained between batches.
        let Some(active) = state.active_label.clone() else {
            return;
        };
        let queued = state.queue_candidates(&active);
        drop(state);
        self.spawn_summaries(&active, queued);
    }
}
