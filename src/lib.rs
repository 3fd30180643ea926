// Stockbot - Library root
//
// Re-exports the store, bot, CLI and configuration modules.

pub mod bot;
pub mod cli;
pub mod config;
pub mod error;
pub mod store;

pub use error::{BotError, Result};
