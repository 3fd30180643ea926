// Stockbot - Command Router
//
// Authorization, then exactly one stock operation, then a single `Reply`
// describing everything the transport has to send.

use zeroize::Zeroizing;

use crate::store::{capitalize, AccountPayload, ServiceName, StockPool, StoreError};

use super::access::{authorize, AccessPolicy, Caller};
use super::commands::BotCommand;

pub const HELP_TEXT: &str = "\n/gen <service>\n/stock\n/add <service> <account>\n/help";

pub const MSG_CHECK_DMS: &str = "✅ Check your messages for the account";
pub const MSG_NO_STOCK: &str = "⚠️ No stock available";
pub const MSG_GENERATE_FAILED: &str = "⚠️ Sorry, can't generate an account right now";
pub const MSG_STOCK_FAILED: &str = "⚠️ Sorry, can't fetch stock right now";
pub const MSG_ADD_FAILED: &str = "⚠️ There was an error adding the account";

/// Credential text to deliver privately to the caller.
pub struct PrivateDelivery {
    pub credential_id: i64,
    pub text: Zeroizing<String>,
}

impl std::fmt::Debug for PrivateDelivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateDelivery")
            .field("credential_id", &self.credential_id)
            .field("text", &"[REDACTED]")
            .finish()
    }
}

/// Broadcast after a successful add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestockNotice {
    pub service: ServiceName,
    pub added: usize,
    pub total: u64,
}

/// Everything one invocation produces. `message` is always sent exactly once;
/// `delivery` and `notice` are best-effort extras.
#[derive(Debug)]
pub struct Reply {
    pub message: String,
    pub ephemeral: bool,
    pub delivery: Option<PrivateDelivery>,
    pub notice: Option<RestockNotice>,
}

impl Reply {
    pub fn private(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ephemeral: true,
            delivery: None,
            notice: None,
        }
    }

    pub fn public(message: impl Into<String>) -> Self {
        Self {
            ephemeral: false,
            ..Self::private(message)
        }
    }
}

pub struct Router {
    pool: StockPool,
    policy: AccessPolicy,
}

impl Router {
    pub fn new(pool: StockPool, policy: AccessPolicy) -> Self {
        Self { pool, policy }
    }

    pub async fn handle(&self, caller: &Caller, command: BotCommand) -> Reply {
        if let Err(denial) = authorize(&self.policy, caller, command.capability()) {
            tracing::info!(
                user_id = caller.user_id,
                command = command.name(),
                ?denial,
                "Command refused"
            );
            return Reply::private(denial.to_string());
        }

        match command {
            BotCommand::Generate { service } => self.generate(caller, &service).await,
            BotCommand::Stock => self.stock().await,
            BotCommand::Add { service, accounts } => self.add(caller, &service, &accounts).await,
            BotCommand::Help => Reply::private(HELP_TEXT),
        }
    }

    async fn generate(&self, caller: &Caller, raw_service: &str) -> Reply {
        let service = match ServiceName::parse(raw_service) {
            Ok(s) => s,
            Err(_) => return Reply::private(MSG_NO_STOCK),
        };

        match self.pool.claim_one(service.clone()).await {
            Ok(Some(credential)) => {
                tracing::info!(
                    user_id = caller.user_id,
                    credential_id = credential.id,
                    service = %service,
                    "Account generated"
                );
                let text = format!(
                    "Your {} account:\n\n{}",
                    service.display_name(),
                    credential.payload()
                );
                Reply {
                    delivery: Some(PrivateDelivery {
                        credential_id: credential.id,
                        text: Zeroizing::new(text),
                    }),
                    ..Reply::private(MSG_CHECK_DMS)
                }
            }
            Ok(None) => Reply::private(MSG_NO_STOCK),
            Err(e) => {
                tracing::error!(service = %service, error = %e, "Failed to claim account");
                Reply::private(MSG_GENERATE_FAILED)
            }
        }
    }

    async fn stock(&self) -> Reply {
        match self.pool.count_by_service().await {
            Ok(counts) if counts.is_empty() => Reply::private(MSG_NO_STOCK),
            Ok(counts) => Reply::private(format_stock(counts.iter())),
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch stock");
                Reply::private(MSG_STOCK_FAILED)
            }
        }
    }

    async fn add(&self, caller: &Caller, raw_service: &str, raw_accounts: &str) -> Reply {
        let parsed = ServiceName::parse(raw_service)
            .and_then(|s| AccountPayload::parse_list(raw_accounts).map(|p| (s, p)));
        let (service, payloads) = match parsed {
            Ok(parsed) => parsed,
            Err(e) => return Reply::private(input_error_message(&e)),
        };

        match self.pool.restock(service.clone(), payloads).await {
            Ok(restock) => {
                tracing::info!(
                    user_id = caller.user_id,
                    service = %service,
                    added = restock.added,
                    total = restock.total,
                    "Restock by admin"
                );
                Reply {
                    notice: Some(RestockNotice {
                        service,
                        added: restock.added,
                        total: restock.total,
                    }),
                    ..Reply::public(format!("{} account(s) added", restock.added))
                }
            }
            Err(e) if e.is_input_error() => Reply::private(input_error_message(&e)),
            Err(e) => {
                tracing::error!(service = %service, error = %e, "Failed to add accounts");
                Reply::private(MSG_ADD_FAILED)
            }
        }
    }
}

/// One `Service: count` line per service, in name order.
pub fn format_stock<'a, I>(counts: I) -> String
where
    I: IntoIterator<Item = (&'a String, &'a u64)>,
{
    counts
        .into_iter()
        .map(|(service, count)| format!("{}: {}", capitalize(service), count))
        .collect::<Vec<_>>()
        .join("\n")
}

fn input_error_message(err: &StoreError) -> String {
    match err {
        StoreError::MalformedInput { index, .. } => format!(
            "⚠️ Account #{} is malformed, expected email:password. Nothing was added",
            index
        ),
        StoreError::EmptyBatch => "⚠️ No accounts supplied".to_string(),
        StoreError::EmptyService => "⚠️ Service name must not be empty".to_string(),
        _ => MSG_ADD_FAILED.to_string(),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::access::Denial;
    use crate::store::Database;

    const CHANNEL: u64 = 42;

    fn router() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stock.db");
        Database::open(&path, None).unwrap().migrate().unwrap();
        let pool = StockPool::new(path, None);
        let policy = AccessPolicy {
            required_role: "GEN".to_string(),
            channel_id: CHANNEL,
        };
        (dir, Router::new(pool, policy))
    }

    fn member() -> Caller {
        Caller {
            user_id: 1,
            channel_id: CHANNEL,
            role_names: vec!["GEN".to_string()],
            is_admin: false,
        }
    }

    fn admin() -> Caller {
        Caller {
            is_admin: true,
            ..member()
        }
    }

    fn add(service: &str, accounts: &str) -> BotCommand {
        BotCommand::Add {
            service: service.to_string(),
            accounts: accounts.to_string(),
        }
    }

    fn generate(service: &str) -> BotCommand {
        BotCommand::Generate {
            service: service.to_string(),
        }
    }

    #[tokio::test]
    async fn test_scenario_generate_until_empty() {
        let (_dir, router) = router();

        let reply = router.handle(&admin(), add("Netflix", "a@x.com:1,b@x.com:2")).await;
        assert!(!reply.ephemeral, "Add reply is public");
        assert_eq!(reply.message, "2 account(s) added");
        assert_eq!(
            reply.notice,
            Some(RestockNotice {
                service: ServiceName::parse("netflix").unwrap(),
                added: 2,
                total: 2
            })
        );

        let reply = router.handle(&member(), BotCommand::Stock).await;
        assert_eq!(reply.message, "Netflix: 2");
        assert!(reply.ephemeral);

        let reply = router.handle(&member(), generate("minecraft")).await;
        assert_eq!(reply.message, MSG_NO_STOCK);
        assert!(reply.delivery.is_none());

        let first = router.handle(&member(), generate("netflix")).await;
        let second = router.handle(&member(), generate("NETFLIX")).await;
        assert_eq!(first.message, MSG_CHECK_DMS);
        let first = first.delivery.unwrap();
        let second = second.delivery.unwrap();
        assert_ne!(first.credential_id, second.credential_id);
        assert_ne!(first.text.as_str(), second.text.as_str());
        assert!(first.text.starts_with("Your Netflix account:\n\n"));

        let reply = router.handle(&member(), BotCommand::Stock).await;
        assert_eq!(reply.message, MSG_NO_STOCK, "Empty services are omitted");
    }

    #[tokio::test]
    async fn test_generate_delivers_payload_verbatim() {
        let (_dir, router) = router();
        router.handle(&admin(), add("hulu", "Me@Example.com:Pa$$:word")).await;

        let reply = router.handle(&member(), generate("Hulu")).await;
        let delivery = reply.delivery.unwrap();
        assert_eq!(delivery.text.as_str(), "Your Hulu account:\n\nMe@Example.com:Pa$$:word");
    }

    #[tokio::test]
    async fn test_malformed_add_changes_nothing() {
        let (_dir, router) = router();

        let reply = router.handle(&admin(), add("netflix", "a@x.com:1,onlyonestring")).await;
        assert!(reply.ephemeral);
        assert!(reply.notice.is_none());
        assert!(reply.message.contains("#2"));

        let reply = router.handle(&member(), BotCommand::Stock).await;
        assert_eq!(reply.message, MSG_NO_STOCK);
    }

    #[tokio::test]
    async fn test_add_requires_admin() {
        let (_dir, router) = router();

        let reply = router.handle(&member(), add("netflix", "a:1")).await;
        assert_eq!(reply.message, Denial::NotAdmin.to_string());
        assert!(reply.notice.is_none());

        let reply = router.handle(&member(), BotCommand::Stock).await;
        assert_eq!(reply.message, MSG_NO_STOCK);
    }

    #[tokio::test]
    async fn test_denied_callers_never_touch_stock() {
        let (_dir, router) = router();
        router.handle(&admin(), add("netflix", "a:1")).await;

        let outsider = Caller {
            role_names: vec![],
            ..member()
        };
        let elsewhere = Caller {
            channel_id: CHANNEL + 1,
            ..member()
        };

        for caller in [&outsider, &elsewhere] {
            let reply = router.handle(caller, generate("netflix")).await;
            assert!(reply.delivery.is_none());
            assert!(reply.ephemeral);
        }

        let reply = router.handle(&member(), BotCommand::Stock).await;
        assert_eq!(reply.message, "Netflix: 1");
    }

    #[tokio::test]
    async fn test_help_is_static() {
        let (_dir, router) = router();
        let reply = router.handle(&member(), BotCommand::Help).await;
        assert_eq!(reply.message, HELP_TEXT);
        assert!(reply.ephemeral);
    }

    #[test]
    fn test_format_stock_lines() {
        let mut counts = std::collections::BTreeMap::new();
        counts.insert("minecraft".to_string(), 4u64);
        counts.insert("netflix".to_string(), 2u64);

        assert_eq!(format_stock(counts.iter()), "Minecraft: 4\nNetflix: 2");
    }
}
