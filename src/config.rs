// Stockbot - Configuration
//
// Everything comes from environment variables. Reads go through `ReadEnv`
// so tests can supply an in-memory environment.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Role a member must hold to use any command.
pub const GENERATOR_ROLE: &str = "GEN";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("{name} must be a numeric Discord id, got {value:?}")]
    InvalidId { name: &'static str, value: String },
}

/// Source of environment variables.
pub trait ReadEnv {
    fn var(&self, key: &str) -> Result<String, env::VarError>;
}

/// Delegates to `std::env`.
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    fn var(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }
}

/// Where the stock database lives.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Directory holding the database file.
    pub host: PathBuf,
    /// Owner label; SQLite has no users so this is only logged.
    pub user: Option<String>,
    /// SQLCipher passphrase. `None` leaves the file unencrypted.
    pub password: Option<String>,
    /// File stem of the database.
    pub name: String,
}

impl DatabaseConfig {
    pub fn path(&self) -> PathBuf {
        self.host.join(format!("{}.db", self.name))
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("name", &self.name)
            .finish()
    }
}

/// Discord connection and scoping.
#[derive(Clone, PartialEq, Eq)]
pub struct DiscordConfig {
    pub token: String,
    pub guild_id: u64,
    /// The only channel commands are served in.
    pub channel_id: u64,
    /// Channel that receives restock notices.
    pub restock_channel_id: u64,
    pub generator_role: String,
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"[REDACTED]")
            .field("guild_id", &self.guild_id)
            .field("channel_id", &self.channel_id)
            .field("restock_channel_id", &self.restock_channel_id)
            .field("generator_role", &self.generator_role)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database: DatabaseConfig,
    pub discord: DiscordConfig,
}

impl Config {
    /// Load the bot configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_impl(&SystemEnv)
    }

    pub fn from_env_impl<E: ReadEnv>(env: &E) -> Result<Self, ConfigError> {
        let database = DatabaseConfig::from_env_impl(env)?;

        let token = required(env, "DISCORD_TOKEN")?;
        let guild_id = required_id(env, "DISCORD_GUILD_ID")?;
        let channel_id = required_id(env, "DISCORD_CHANNEL_ID")?;
        let restock_channel_id = required_id(env, "RESTOCK_CHANNEL_NOTI")?;

        Ok(Config {
            database,
            discord: DiscordConfig {
                token,
                guild_id,
                channel_id,
                restock_channel_id,
                generator_role: GENERATOR_ROLE.to_string(),
            },
        })
    }
}

impl DatabaseConfig {
    /// Only the database half of the environment; used by the offline CLI
    /// commands, which have no Discord credentials.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_impl(&SystemEnv)
    }

    pub fn from_env_impl<E: ReadEnv>(env: &E) -> Result<Self, ConfigError> {
        Ok(DatabaseConfig {
            host: optional(env, "DB_HOST")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            user: optional(env, "DB_USER"),
            password: optional(env, "DB_PASSWORD"),
            name: required(env, "DB_NAME")?,
        })
    }
}

fn optional<E: ReadEnv>(env: &E, key: &str) -> Option<String> {
    env.var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<E: ReadEnv>(env: &E, key: &'static str) -> Result<String, ConfigError> {
    optional(env, key).ok_or(ConfigError::Missing(key))
}

fn required_id<E: ReadEnv>(env: &E, key: &'static str) -> Result<u64, ConfigError> {
    let value = required(env, key)?;
    value
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidId { name: key, value })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
