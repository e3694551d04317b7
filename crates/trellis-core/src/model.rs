use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    Inbox,
    Todo,
    InProgress,
    Done,
    Snoozed,
}

impl ItemStatus {
    /// Fixed board order. Also the search order for item lookups.
    pub const ALL: [ItemStatus; 5] = [
        ItemStatus::Inbox,
        ItemStatus::Todo,
        ItemStatus::InProgress,
        ItemStatus::Done,
        ItemStatus::Snoozed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Inbox => "INBOX",
            ItemStatus::Todo => "TODO",
            ItemStatus::InProgress => "IN_PROGRESS",
            ItemStatus::Done => "DONE",
            ItemStatus::Snoozed => "SNOOZED",
        }
    }

    /// Column title as shown on the board.
    pub fn title(&self) -> &'static str {
        match self {
            ItemStatus::Inbox => "Inbox",
            ItemStatus::Todo => "To Do",
            ItemStatus::InProgress => "In Progress",
            ItemStatus::Done => "Done",
            ItemStatus::Snoozed => "Snoozed",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "INBOX" => Ok(ItemStatus::Inbox),
            "TODO" => Ok(ItemStatus::Todo),
            "IN_PROGRESS" => Ok(ItemStatus::InProgress),
            "DONE" => Ok(ItemStatus::Done),
            "SNOOZED" => Ok(ItemStatus::Snoozed),
            other => Err(format!(
                "unknown status '{other}': use INBOX, TODO, IN_PROGRESS, DONE or SNOOZED"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardItem {
    /// Remote message id. Unique and stable across refetches.
    pub id: String,
    pub sender_name: String,
    pub sender_email: String,
    pub subject: String,
    /// AI summary; absent until the summarizer has run.
    #[serde(default)]
    pub summary: Option<String>,
    pub status: ItemStatus,
}

/// Full board state for one mailbox label. Insertion order within a column
/// is display order; each item id lives in exactly one column.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub columns: BTreeMap<ItemStatus, Vec<BoardItem>>,
}

impl BoardSnapshot {
    pub fn column(&self, status: ItemStatus) -> &[BoardItem] {
        self.columns.get(&status).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Appends an item to its own status column.
    pub fn push_item(&mut self, item: BoardItem) {
        self.columns.entry(item.status).or_default().push(item);
    }

    /// First match in `ItemStatus::ALL` order. Ids must not appear twice,
    /// so the first hit is definitive.
    pub fn find_item(&self, item_id: &str) -> Option<(ItemStatus, usize)> {
        for status in ItemStatus::ALL {
            if let Some(index) = self
                .column(status)
                .iter()
                .position(|item| item.id == item_id)
            {
                return Some((status, index));
            }
        }

        None
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.find_item(item_id).is_some()
    }

    /// All items flattened in fixed column order.
    pub fn items(&self) -> impl Iterator<Item = &BoardItem> + '_ {
        ItemStatus::ALL
            .into_iter()
            .flat_map(|status| self.column(status).iter())
    }

    pub fn len(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.values().all(Vec::is_empty)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LabelKind {
    System,
    User,
}

/// Label as reported by the remote label listing. Consumed only by the
/// column-settings validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExternalLabel {
    pub id: String,
    pub name: String,
    pub kind: LabelKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, status: ItemStatus) -> BoardItem {
        BoardItem {
            id: id.to_string(),
            sender_name: "Dana Reeve".to_string(),
            sender_email: "dana@example.com".to_string(),
            subject: format!("subject {id}"),
            summary: None,
            status,
        }
    }

    #[test]
    fn parses_wire_status_names() {
        assert_eq!(
            "IN_PROGRESS".parse::<ItemStatus>().expect("status parsed"),
            ItemStatus::InProgress
        );
        assert_eq!(
            " done ".parse::<ItemStatus>().expect("status parsed"),
            ItemStatus::Done
        );

        let err = "ARCHIVED".parse::<ItemStatus>().expect_err("unknown status");
        assert!(err.contains("ARCHIVED"));
        assert!(err.contains("SNOOZED"));
    }

    #[test]
    fn status_titles_match_board_columns() {
        assert_eq!(ItemStatus::Inbox.title(), "Inbox");
        assert_eq!(ItemStatus::Todo.title(), "To Do");
        assert_eq!(ItemStatus::InProgress.title(), "In Progress");
        assert_eq!(ItemStatus::Snoozed.title(), "Snoozed");
    }

    #[test]
    fn find_item_searches_columns_in_fixed_order() {
        let mut snapshot = BoardSnapshot::default();
        snapshot.push_item(item("a", ItemStatus::Done));
        snapshot.push_item(item("b", ItemStatus::Inbox));
        snapshot.push_item(item("c", ItemStatus::Inbox));

        assert_eq!(snapshot.find_item("c"), Some((ItemStatus::Inbox, 1)));
        assert_eq!(snapshot.find_item("a"), Some((ItemStatus::Done, 0)));
        assert_eq!(snapshot.find_item("missing"), None);
    }

    #[test]
    fn items_flatten_in_column_order() {
        let mut snapshot = BoardSnapshot::default();
        snapshot.push_item(item("done-1", ItemStatus::Done));
        snapshot.push_item(item("inbox-1", ItemStatus::Inbox));
        snapshot.push_item(item("todo-1", ItemStatus::Todo));

        let ids: Vec<&str> = snapshot.items().map(|entry| entry.id.as_str()).collect();
        assert_eq!(ids, vec!["inbox-1", "todo-1", "done-1"]);
        assert_eq!(snapshot.len(), 3);
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn empty_column_reads_as_empty_slice() {
        let snapshot = BoardSnapshot::default();
        assert!(snapshot.column(ItemStatus::Todo).is_empty());
        assert!(snapshot.is_empty());
    }
}
