// Stockbot - Command Authorization
//
// `authorize` is a pure predicate over the caller and the capability a
// command needs. Gates are evaluated in a fixed order: role, channel, admin.

use thiserror::Error;

/// What a command asks of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Generator role, in the restricted channel.
    Use,
    /// Everything `Use` needs, plus the Administrator permission.
    Administer,
}

/// Who invoked a command and from where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: u64,
    pub channel_id: u64,
    /// Names of the roles the member holds in the configured guild.
    pub role_names: Vec<String>,
    /// The member has the Administrator permission.
    pub is_admin: bool,
}

impl Caller {
    pub fn has_role(&self, name: &str) -> bool {
        self.role_names.iter().any(|r| r == name)
    }
}

/// The scopes configured for this bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    pub required_role: String,
    pub channel_id: u64,
}

/// Why an invocation was refused. The message is shown to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("⚠️ You do not have permission to use this bot!")]
    MissingRole,

    #[error("⚠️ Sorry, I can only work in the GEN channel")]
    WrongChannel,

    #[error("⚠️ Only admins can use this command")]
    NotAdmin,
}

pub fn authorize(
    policy: &AccessPolicy,
    caller: &Caller,
    capability: Capability,
) -> Result<(), Denial> {
    if !caller.has_role(&policy.required_role) {
        return Err(Denial::MissingRole);
    }
    if caller.channel_id != policy.channel_id {
        return Err(Denial::WrongChannel);
    }
    if capability == Capability::Administer && !caller.is_admin {
        return Err(Denial::NotAdmin);
    }
    Ok(())
}
