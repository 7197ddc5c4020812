//! Errors shared by every store implementation.

use thiserror::Error;

/// Failure reported by a backing store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached or failed internally; retrying may help.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("Row not found".into()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(db_err.message().to_string()),
                Some("23503") => StoreError::NotFound(db_err.message().to_string()),
                _ => StoreError::Unavailable(db_err.to_string()),
            },
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}
