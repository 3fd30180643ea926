// Stockbot - Store error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Malformed account #{index} (expected email:password): {entry:?}")]
    MalformedInput { index: usize, entry: String },

    #[error("No accounts supplied")]
    EmptyBatch,

    #[error("Service name must not be empty")]
    EmptyService,

    #[error("Invalid database key - database may be corrupted or the password is wrong")]
    InvalidKey,

    #[error("Store worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl StoreError {
    /// True when the error comes from user input rather than the database.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            StoreError::MalformedInput { .. } | StoreError::EmptyBatch | StoreError::EmptyService
        )
    }
}
