// Stockbot - CLI Command Handlers
//
// Each function handles one CLI subcommand. `serve` runs the Discord bot;
// the others operate on the stock database directly.

use serenity::model::gateway::GatewayIntents;
use serenity::prelude::*;

use crate::bot::{AccessPolicy, Handler, Router};
use crate::config::{Config, DatabaseConfig};
use crate::error::BotError;
use crate::store::{capitalize, AccountPayload, ServiceName, StockPool};

use super::Commands;

/// Execute the parsed CLI command. No subcommand means `serve`.
pub async fn execute(command: Option<Commands>) -> Result<(), BotError> {
    match command.unwrap_or(Commands::Serve) {
        Commands::Serve => cmd_serve().await,
        Commands::Init => cmd_init().await,
        Commands::Stock => cmd_stock().await,
        Commands::Add { service, accounts } => cmd_add(service, accounts).await,
    }
}

// ─── Serve ───────────────────────────────────────────────────────────────────

async fn cmd_serve() -> Result<(), BotError> {
    let config = Config::from_env()?;
    let pool = open_pool(&config.database).await?;

    let router = Router::new(
        pool,
        AccessPolicy {
            required_role: config.discord.generator_role.clone(),
            channel_id: config.discord.channel_id,
        },
    );
    let handler = Handler::new(router, config.discord.clone());

    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES;
    let mut client = Client::builder(&config.discord.token, intents)
        .event_handler(handler)
        .await?;

    // Close all shards on SIGTERM or Ctrl+C.
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = sigterm.recv() => {}
                    }
                }
                Err(e) => {
                    tracing::warn!("SIGTERM handler unavailable: {}", e);
                    tokio::signal::ctrl_c().await.ok();
                }
            }
        }
        #[cfg(not(unix))]
        {
            tokio::signal::ctrl_c().await.ok();
        }
        tracing::info!("Shutdown signal received, stopping Discord client...");
        shard_manager.shutdown_all().await;
    });

    tracing::info!(guild_id = config.discord.guild_id, "The bot is online");
    client.start().await?;

    tracing::info!("Discord bot stopped");
    Ok(())
}

// ─── Init ────────────────────────────────────────────────────────────────────

async fn cmd_init() -> Result<(), BotError> {
    let db = DatabaseConfig::from_env()?;
    std::fs::create_dir_all(&db.host)?;
    let pool = open_pool(&db).await?;

    println!("✓ Stock database ready");
    println!("  Database:  {}", pool.db_path().display());
    println!(
        "  Encrypted: {}",
        if db.password.is_some() { "yes" } else { "no" }
    );

    Ok(())
}

// ─── Stock ───────────────────────────────────────────────────────────────────

async fn cmd_stock() -> Result<(), BotError> {
    let pool = open_pool(&DatabaseConfig::from_env()?).await?;
    let counts = pool.count_by_service().await?;

    if counts.is_empty() {
        println!("No stock available.");
        return Ok(());
    }

    for (service, count) in &counts {
        println!("  {:16} │ {}", capitalize(service), count);
    }

    Ok(())
}

// ─── Add ─────────────────────────────────────────────────────────────────────

async fn cmd_add(service: String, accounts: String) -> Result<(), BotError> {
    let service = ServiceName::parse(&service)?;
    let payloads = AccountPayload::parse_list(&accounts)?;

    let pool = open_pool(&DatabaseConfig::from_env()?).await?;
    let restock = pool.restock(service.clone(), payloads).await?;

    println!("✓ {} account(s) added", restock.added);
    println!("  Service: {}", service.display_name());
    println!("  Stock:   {}", restock.total);

    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

async fn open_pool(db: &DatabaseConfig) -> Result<StockPool, BotError> {
    let pool = StockPool::new(db.path(), db.password.clone());
    pool.ensure_schema().await?;

    tracing::info!(
        path = %pool.db_path().display(),
        owner = db.user.as_deref().unwrap_or("-"),
        encrypted = db.password.is_some(),
        "Stock database opened"
    );

    Ok(pool)
}
