// Stockbot - Embeds
//
// Builders for replies, private deliveries and restock notices.

use serenity::builder::{CreateEmbed, CreateEmbedFooter};
use serenity::model::Timestamp;
use serenity::model::user::User;
use serenity::prelude::Mentionable;

use super::router::RestockNotice;

const EMBED_COLOUR: u32 = 0x009ad6;
const EMBED_TITLE: &str = "GOAT GEN";

/// Standard bot embed: brand colour, fixed title, bold body.
pub fn create_embed(content: &str) -> CreateEmbed {
    CreateEmbed::new()
        .colour(EMBED_COLOUR)
        .title(EMBED_TITLE)
        .description(format!("**{}**", content))
}

/// `(name, value, inline)` rows of the restock notice.
pub fn restock_fields(notice: &RestockNotice, restocked_by: &str) -> Vec<(String, String, bool)> {
    vec![
        (
            "``⚙️`` **Type**".to_string(),
            format!("``{}``", notice.service.display_name()),
            true,
        ),
        (
            "``📈`` **Restock Amount**".to_string(),
            format!("``{}``", notice.added),
            true,
        ),
        (
            "``📰`` **Stock Amount**".to_string(),
            format!("``{}``", notice.total),
            true,
        ),
        (
            "``🙋‍♂️`` **Restocked by**".to_string(),
            restocked_by.to_string(),
            true,
        ),
    ]
}

/// Broadcast embed posted to the restock channel.
pub fn restock_embed(notice: &RestockNotice, user: &User) -> CreateEmbed {
    let mut footer = CreateEmbedFooter::new(format!("Restocked by {}", user.tag()));
    if let Some(avatar) = user.avatar_url() {
        footer = footer.icon_url(avatar);
    }

    CreateEmbed::new()
        .colour(EMBED_COLOUR)
        .title("``🔔`` **New Restock** ``🔔``")
        .fields(restock_fields(notice, &user.mention().to_string()))
        .timestamp(Timestamp::now())
        .footer(footer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ServiceName;

    #[test]
    fn test_restock_fields() {
        let notice = RestockNotice {
            service: ServiceName::parse("netflix").unwrap(),
            added: 3,
            total: 10,
        };

        let fields = restock_fields(&notice, "<@42>");
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].1, "``Netflix``");
        assert_eq!(fields[1].1, "``3``");
        assert_eq!(fields[2].1, "``10``");
        assert_eq!(fields[3].1, "<@42>");
        assert!(fields.iter().all(|(_, _, inline)| *inline));
    }
}
