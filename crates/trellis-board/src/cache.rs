use crate::{apply_move, apply_summary};
use std::collections::HashMap;
use trellis_core::{BoardSnapshot, ItemStatus};

/// Client-side board cache keyed by mailbox label. Entries survive mailbox
/// switches; the fresh fetch on each selection overwrites them.
#[derive(Debug, Default)]
pub struct BoardCache {
    boards: HashMap<String, BoardSnapshot>,
}

impl BoardCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, label: &str) -> Option<&BoardSnapshot> {
        self.boards.get(label)
    }

    /// Cloned snapshot, used as the rollback capture before an optimistic
    /// patch.
    pub fn snapshot(&self, label: &str) -> Option<BoardSnapshot> {
        self.boards.get(label).cloned()
    }

    pub fn replace(&mut self, label: &str, snapshot: BoardSnapshot) {
        self.boards.insert(label.to_string(), snapshot);
    }

    /// Optimistic move against the cached board. No-op when the label has no
    /// cached board or the item is unknown.
    pub fn patch_move(&mut self, label: &str, item_id: &str, target: ItemStatus) {
        if let Some(board) = self.boards.get_mut(label) {
            *board = apply_move(board, item_id, target);
        }
    }

    /// Summary backfill against the cached board.
    pub fn patch_summary(&mut self, label: &str, item_id: &str, summary: &str) {
        if let Some(board) = self.boards.get_mut(label) {
            *board = apply_summary(board, item_id, summary);
        }
    }
}
