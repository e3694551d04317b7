use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid data: {0}")]
    Data(String),
}
