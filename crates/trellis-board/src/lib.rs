mod cache;
mod drag;
mod patch;

pub use cache::BoardCache;
pub use drag::{resolve_drop, DragController, DropTarget, DropZone, MoveIntent, Point, Rect};
pub use patch::{apply_move, apply_summary};
