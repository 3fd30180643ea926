// Stockbot - Discord bot
//
// Slash-command registration, authorization and dispatch to the stock store.

pub mod access;
pub mod commands;
pub mod embeds;
mod handler;
pub mod router;

pub use access::{authorize, AccessPolicy, Caller, Capability, Denial};
pub use commands::{BotCommand, CommandRegistry};
pub use handler::Handler;
pub use router::{Reply, RestockNotice, Router};
