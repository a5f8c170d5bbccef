use crate::core::validation::ValidationError;
use thiserror::Error;
use uuid::Uuid;

/// Failure talking to the row store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP error: {status} for table: {table}")]
    Status {
        status: reqwest::StatusCode,
        table: String,
    },
    #[error("No row in {table} for {key}")]
    NotFound { table: String, key: Uuid },
    #[error("Unrecognized row in {table}: {reason}")]
    Malformed { table: String, reason: String },
    #[error("Storage error: {0}")]
    Backend(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<fjall::Error> for StoreError {
    fn from(e: fjall::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Failure of a user action. The loaded snapshot is left as it was.
#[derive(Debug, Error)]
pub enum BudgetError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Remote call failed: {0}")]
    Store(#[from] StoreError),
    #[error("No profile found for user {0}")]
    UnknownUser(Uuid),
    #[error("No expenditure with id {0}")]
    UnknownExpenditure(Uuid),
}
