use thiserror::Error;

use crate::models::RuleViolation;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("booking not found: {0}")]
    NotFound(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("sheet request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt row {row}: {reason}")]
    CorruptRow { row: usize, reason: String },

    #[error(transparent)]
    Rejected(#[from] RuleViolation),

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
