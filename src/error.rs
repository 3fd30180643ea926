// Stockbot - Top-level error types
//
// Aggregates errors from the store, configuration and Discord client into a
// single error enum for the application boundary.

use thiserror::Error;

/// Top-level error type for all Stockbot operations.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Discord client error: {0}")]
    Discord(#[from] serenity::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BotError>;
