use trellis_core::{BoardSnapshot, ItemStatus};

/// Computes the snapshot after moving `item_id` to the head of `target`'s
/// column, with the item's status field updated to match. The source column
/// is whichever one holds the item (first match in `ItemStatus::ALL` order).
/// Unknown ids leave the board unchanged.
pub fn apply_move(snapshot: &BoardSnapshot, item_id: &str, target: ItemStatus) -> BoardSnapshot {
    let Some((source, index)) = snapshot.find_item(item_id) else {
        return snapshot.clone();
    };

    let mut next = snapshot.clone();
    let Some(column) = next.columns.get_mut(&source) else {
        return next;
    };

    let mut item = column.remove(index);
    item.status = target;
    next.columns.entry(target).or_default().insert(0, item);
    next
}

/// Computes the snapshot after setting `item_id`'s summary. Column
/// membership is untouched; unknown ids leave the board unchanged.
pub fn apply_summary(snapshot: &BoardSnapshot, item_id: &str, summary: &str) -> BoardSnapshot {
    let Some((status, index)) = snapshot.find_item(item_id) else {
        return snapshot.clone();
    };

    let mut next = snapshot.clone();
    if let Some(item) = next
        .columns
        .get_mut(&status)
        .and_then(|column| column.get_mut(index))
    {
        item.summary = Some(summary.to_string());
    }

    next
}
