// Stockbot - CLI Module
//
// Command-line interface using clap derive macros.
// Subcommands: serve (default), init, stock, add.

mod commands;

use clap::{Parser, Subcommand};

pub use commands::execute;

/// Stockbot: dispenses accounts from stock over Discord slash commands.
#[derive(Parser, Debug)]
#[command(name = "stockbot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Connect to Discord and serve slash commands.
    Serve,

    /// Create the stock database and its schema.
    Init,

    /// Print available stock per service.
    Stock,

    /// Add accounts to stock without going through Discord.
    Add {
        /// The service name (e.g., "netflix", "minecraft").
        #[arg(long)]
        service: String,

        /// Comma-separated accounts: "email:password,email:password".
        #[arg(long)]
        accounts: String,
    },
}
