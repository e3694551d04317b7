mod backend;
mod error;
mod service;

pub use backend::{BoardBackend, BoardSettings, HttpBoardBackend};
pub use error::SyncError;
pub use service::{BoardService, Notice};
