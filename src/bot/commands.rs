// Stockbot - Slash Commands
//
// Command definitions, argument parsing and the registered-id table.

use std::collections::HashMap;

use serenity::builder::{CreateCommand, CreateCommandOption};
use serenity::model::application::{Command, CommandOptionType};
use thiserror::Error;

use super::access::Capability;

pub const GENERATE: &str = "gen";
pub const STOCK: &str = "stock";
pub const ADD: &str = "add";
pub const HELP: &str = "help";

const OPT_SERVICE: &str = "service";
const OPT_ACCOUNTS: &str = "accounts";

/// A parsed slash command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Generate { service: String },
    Stock,
    Add { service: String, accounts: String },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandParseError {
    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("missing required option `{option}` for /{command}")]
    MissingOption {
        command: &'static str,
        option: &'static str,
    },
}

impl BotCommand {
    /// Build a command from its name and string options, as Discord delivers them.
    pub fn parse(name: &str, options: &[(String, String)]) -> Result<Self, CommandParseError> {
        let lookup = |command: &'static str, option: &'static str| {
            options
                .iter()
                .find(|(n, _)| n == option)
                .map(|(_, v)| v.clone())
                .ok_or(CommandParseError::MissingOption { command, option })
        };

        match name.to_lowercase().as_str() {
            GENERATE => Ok(BotCommand::Generate {
                service: lookup(GENERATE, OPT_SERVICE)?,
            }),
            STOCK => Ok(BotCommand::Stock),
            ADD => Ok(BotCommand::Add {
                service: lookup(ADD, OPT_SERVICE)?,
                accounts: lookup(ADD, OPT_ACCOUNTS)?,
            }),
            HELP => Ok(BotCommand::Help),
            other => Err(CommandParseError::Unknown(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BotCommand::Generate { .. } => GENERATE,
            BotCommand::Stock => STOCK,
            BotCommand::Add { .. } => ADD,
            BotCommand::Help => HELP,
        }
    }

    pub fn capability(&self) -> Capability {
        match self {
            BotCommand::Add { .. } => Capability::Administer,
            _ => Capability::Use,
        }
    }
}

/// Slash command payloads registered in the guild on startup.
pub fn definitions() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new(GENERATE)
            .description("Generate a random account")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    OPT_SERVICE,
                    "Name of account you want to generate",
                )
                .required(true),
            ),
        CreateCommand::new(STOCK).description("Check account stock"),
        CreateCommand::new(ADD)
            .description("Add accounts")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    OPT_SERVICE,
                    "Name of account service (Minecraft, Netflix)",
                )
                .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    OPT_ACCOUNTS,
                    "Accounts to add (email:password,email:password)",
                )
                .required(true),
            ),
        CreateCommand::new(HELP).description("View all commands for generator"),
    ]
}

/// Command name to Discord-assigned id. Built once after registration and
/// never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    ids: HashMap<String, u64>,
}

impl CommandRegistry {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, u64)>,
    {
        Self {
            ids: pairs.into_iter().collect(),
        }
    }

    pub fn from_commands(commands: &[Command]) -> Self {
        Self::from_pairs(commands.iter().map(|c| (c.name.clone(), c.id.get())))
    }

    /// True only when `name` was registered by this process under `id`.
    /// Commands left in the guild by an earlier run carry other ids.
    pub fn matches(&self, name: &str, id: u64) -> bool {
        self.ids.get(name) == Some(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_generate() {
        let cmd = BotCommand::parse("gen", &opts(&[("service", "Netflix")])).unwrap();
        assert_eq!(cmd, BotCommand::Generate { service: "Netflix".to_string() });
        assert_eq!(cmd.capability(), Capability::Use);
    }

    #[test]
    fn test_parse_add_needs_both_options() {
        let err = BotCommand::parse("add", &opts(&[("service", "hulu")])).unwrap_err();
        assert_eq!(
            err,
            CommandParseError::MissingOption { command: ADD, option: "accounts" }
        );

        let cmd = BotCommand::parse("add", &opts(&[("accounts", "a:b"), ("service", "hulu")]))
            .unwrap();
        assert_eq!(cmd.capability(), Capability::Administer);
    }

    #[test]
    fn test_parse_is_case_insensitive_on_name() {
        assert_eq!(BotCommand::parse("STOCK", &[]).unwrap(), BotCommand::Stock);
        assert_eq!(BotCommand::parse("Help", &[]).unwrap(), BotCommand::Help);
    }

    #[test]
    fn test_parse_unknown() {
        assert!(matches!(
            BotCommand::parse("ping", &[]),
            Err(CommandParseError::Unknown(name)) if name == "ping"
        ));
    }

    #[test]
    fn test_definitions_cover_every_command() {
        assert_eq!(definitions().len(), 4);
    }

    #[test]
    fn test_registry_lookup() {
        let registry = CommandRegistry::from_pairs(vec![
            (GENERATE.to_string(), 11),
            (STOCK.to_string(), 12),
        ]);

        assert!(registry.matches(GENERATE, 11));
        assert!(registry.matches(STOCK, 12));
        assert!(!registry.matches(STOCK, 11), "Stale id from another registration");
        assert!(!registry.matches(ADD, 13));
    }
}
