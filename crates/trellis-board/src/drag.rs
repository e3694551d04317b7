use serde::{Deserialize, Serialize};
use trellis_core::{BoardSnapshot, ItemStatus};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Distance from `point` to the nearest of the four corners.
    fn corner_distance(&self, point: Point) -> f64 {
        let corners = [
            (self.x, self.y),
            (self.x + self.width, self.y),
            (self.x, self.y + self.height),
            (self.x + self.width, self.y + self.height),
        ];

        corners
            .into_iter()
            .map(|(x, y)| ((point.x - x).powi(2) + (point.y - y).powi(2)).sqrt())
            .fold(f64::INFINITY, f64::min)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropTarget {
    Column(ItemStatus),
    Item(String),
}

/// Droppable region registered by the rendering layer for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropZone {
    pub target: DropTarget,
    pub rect: Rect,
}

/// Picks the drop zone under `pointer`: exact containment wins, nearest
/// corner is the fallback when the pointer sits in a gap between zones.
pub fn resolve_drop(pointer: Point, zones: &[DropZone]) -> Option<&DropZone> {
    if let Some(hit) = zones.iter().find(|zone| zone.rect.contains(pointer)) {
        return Some(hit);
    }

    zones.iter().min_by(|a, b| {
        a.rect
            .corner_distance(pointer)
            .total_cmp(&b.rect.corner_distance(pointer))
    })
}

/// Move request produced by a completed drag gesture, to be fed into the
/// mutation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveIntent {
    pub item_id: String,
    pub from: ItemStatus,
    pub to: ItemStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DragState {
    Idle,
    Dragging { item_id: String },
}

/// Translates pointer/keyboard drag gestures into move intents.
#[derive(Debug)]
pub struct DragController {
    state: DragState,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
        }
    }

    /// Starts a gesture; the id is kept for overlay rendering.
    pub fn start(&mut self, item_id: impl Into<String>) {
        self.state = DragState::Dragging {
            item_id: item_id.into(),
        };
    }

    /// The item being dragged, if a gesture is active.
    pub fn active_item(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { item_id } => Some(item_id),
            DragState::Idle => None,
        }
    }

    /// Abandons the gesture with no side effect.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Ends the gesture over `pointer`. Returns a move intent when the drop
    /// resolves to a column different from the one the item came from;
    /// same-column and unresolvable drops are no-ops.
    pub fn finish(
        &mut self,
        snapshot: &BoardSnapshot,
        pointer: Point,
        zones: &[DropZone],
    ) -> Option<MoveIntent> {
        let previous = std::mem::replace(&mut self.state, DragState::Idle);
        let DragState::Dragging { item_id } = previous else {
            return None;
        };

        let (from, _) = snapshot.find_item(&item_id)?;
        let zone = resolve_drop(pointer, zones)?;
        let to = match &zone.target {
            DropTarget::Column(status) => *status,
            DropTarget::Item(other) => snapshot.find_item(other)?.0,
        };

        if to == from {
            return None;
        }

        Some(MoveIntent { item_id, from, to })
    }
}
