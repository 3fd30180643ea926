// Stockbot - Discord Event Handler
//
// Registers the slash commands on `ready` and turns every command
// interaction into exactly one response.

use std::sync::OnceLock;

use serenity::async_trait;
use serenity::builder::{CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage};
use serenity::http::HttpError;
use serenity::model::application::{CommandInteraction, Interaction};
use serenity::model::gateway::Ready;
use serenity::model::id::{ChannelId, GuildId};
use serenity::prelude::*;
use tracing::{error, info, warn};

use crate::config::DiscordConfig;

use super::access::Caller;
use super::commands::{definitions, BotCommand, CommandRegistry};
use super::embeds;
use super::router::{Reply, Router};

/// Shown when the caller's roles cannot be resolved.
const MSG_LOOKUP_FAILED: &str = "⚠️ Sorry, something went wrong. Try again later";

/// Shown for commands this process has not registered (yet).
const MSG_NOT_READY: &str = "⚠️ The generator is starting up. Try again in a moment";

/// Discord API code for "Cannot send messages to this user".
const CANNOT_DM_USER: isize = 50007;

pub struct Handler {
    router: Router,
    config: DiscordConfig,
    registry: OnceLock<CommandRegistry>,
}

impl Handler {
    pub fn new(router: Router, config: DiscordConfig) -> Self {
        Self {
            router,
            config,
            registry: OnceLock::new(),
        }
    }

    fn guild_id(&self) -> GuildId {
        GuildId::new(self.config.guild_id)
    }

    /// Member roles are resolved against the configured guild, even for
    /// invocations that arrive elsewhere.
    async fn resolve_caller(
        &self,
        ctx: &Context,
        cmd: &CommandInteraction,
    ) -> Result<Caller, serenity::Error> {
        let member = match &cmd.member {
            Some(member) => (**member).clone(),
            None => self.guild_id().member(ctx, cmd.user.id).await?,
        };
        let roles = self.guild_id().roles(&ctx.http).await?;

        let role_names = member
            .roles
            .iter()
            .filter_map(|id| roles.get(id))
            .map(|role| role.name.clone())
            .collect();
        let is_admin = member
            .permissions
            .map(|p| p.administrator())
            .unwrap_or(false);

        Ok(Caller {
            user_id: cmd.user.id.get(),
            channel_id: cmd.channel_id.get(),
            role_names,
            is_admin,
        })
    }

    async fn dispatch(&self, ctx: &Context, cmd: &CommandInteraction) -> Reply {
        let options: Vec<(String, String)> = cmd
            .data
            .options
            .iter()
            .filter_map(|opt| {
                opt.value
                    .as_str()
                    .map(|value| (opt.name.clone(), value.to_string()))
            })
            .collect();

        let command = match BotCommand::parse(&cmd.data.name, &options) {
            Ok(command) => command,
            Err(e) => {
                warn!("Rejected /{} invocation: {}", cmd.data.name, e);
                return Reply::private(MSG_LOOKUP_FAILED);
            }
        };

        let caller = match self.resolve_caller(ctx, cmd).await {
            Ok(caller) => caller,
            Err(e) => {
                error!(user_id = cmd.user.id.get(), "Failed to resolve caller roles: {}", e);
                return Reply::private(MSG_LOOKUP_FAILED);
            }
        };

        self.router.handle(&caller, command).await
    }

    /// Send the primary reply, then the best-effort extras.
    async fn deliver(&self, ctx: &Context, cmd: &CommandInteraction, reply: Reply) {
        let message = CreateInteractionResponseMessage::new()
            .embed(embeds::create_embed(&reply.message))
            .ephemeral(reply.ephemeral);

        if let Err(e) = cmd
            .create_response(ctx, CreateInteractionResponse::Message(message))
            .await
        {
            error!("Failed to respond to /{}: {}", cmd.data.name, e);
        }

        if let Some(delivery) = reply.delivery {
            let dm = CreateMessage::new().embed(embeds::create_embed(&delivery.text));
            if let Err(e) = cmd.user.direct_message(ctx, dm).await {
                log_delivery_failure(
                    &format!(
                        "Can't DM user {} (credential {})",
                        cmd.user.tag(),
                        delivery.credential_id
                    ),
                    &e,
                );
            }
        }

        if let Some(notice) = reply.notice {
            let channel = ChannelId::new(self.config.restock_channel_id);
            let message = CreateMessage::new().embed(embeds::restock_embed(&notice, &cmd.user));
            if let Err(e) = channel.send_message(ctx, message).await {
                log_delivery_failure(
                    &format!("Failed to post restock notice to channel {}", channel),
                    &e,
                );
            }
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Discord bot connected as {}", ready.user.name);

        if self.registry.get().is_some() {
            // Reconnects fire `ready` again; the registry stays as first built.
            return;
        }

        match self.guild_id().set_commands(&ctx.http, definitions()).await {
            Ok(commands) => {
                info!(count = commands.len(), "Commands created successfully");
                let _ = self.registry.set(CommandRegistry::from_commands(&commands));
            }
            Err(e) => error!("Failed to register slash commands: {}", e),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(cmd) = interaction else {
            return;
        };

        let reply = match admit(self.registry.get(), &cmd.data.name, cmd.data.id.get()) {
            Ok(()) => self.dispatch(&ctx, &cmd).await,
            Err(reply) => {
                warn!("Rejected unregistered command /{}", cmd.data.name);
                reply
            }
        };
        self.deliver(&ctx, &cmd, reply).await;
    }
}

/// Only commands registered by this process are dispatched. Anything else,
/// including invocations that arrive before registration finishes, still
/// gets a private reply.
fn admit(registry: Option<&CommandRegistry>, name: &str, id: u64) -> Result<(), Reply> {
    match registry {
        Some(registry) if registry.matches(name, id) => Ok(()),
        _ => Err(Reply::private(MSG_NOT_READY)),
    }
}

/// A closed DM inbox is expected and logged at `warn`; anything else at `error`.
fn log_delivery_failure(context: &str, err: &serenity::Error) {
    match err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(resp))
            if resp.error.code == CANNOT_DM_USER =>
        {
            warn!("{}: recipient does not accept direct messages", context);
        }
        _ => error!("{}: {}", context, err),
    }
}
