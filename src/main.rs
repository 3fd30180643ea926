// Stockbot - Application Entry Point
//
// Parses CLI arguments, initializes structured logging, and dispatches to
// the command handler. Account payloads are never logged at any level.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use stockbot::cli::{execute, Cli};

#[tokio::main]
async fn main() {
    // RUST_LOG=stockbot=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stockbot=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = execute(cli.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
