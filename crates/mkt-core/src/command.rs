//! Text command surface (`!`-prefixed, case-sensitive).

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::UserId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShopCommand {
    /// `!shop` — post the marketplace menu (privileged).
    Shop,
    /// `!clearshop` — wipe every listing (privileged).
    ClearShop,
    /// `!viewtrades` — list active trade offerings (public).
    ViewTrades,
    /// `!setchannel` — announcements go to the current channel (privileged).
    SetChannel,
    /// `!setshop <category_id>` — ticket channels go under this category
    /// (privileged). `None` argument means the usage reply.
    SetShop(Option<String>),
    /// `!addadm <id|mention>` (owner only).
    AddAdmin(Option<UserId>),
    /// `!remadm <id|mention>` (owner only).
    RemoveAdmin(Option<UserId>),
    /// `!listadm` (owner only).
    ListAdmins,
    /// `!removelisting` — redirect to the button flow (public).
    RemoveListing,
}

/// Parse a message body into a command. Non-command text yields `None`.
pub fn parse(text: &str) -> Option<ShopCommand> {
    match text {
        "!shop" => return Some(ShopCommand::Shop),
        "!clearshop" => return Some(ShopCommand::ClearShop),
        "!viewtrades" => return Some(ShopCommand::ViewTrades),
        _ => {}
    }

    if text.starts_with("!setchannel") {
        return Some(ShopCommand::SetChannel);
    }
    if text.starts_with("!setshop") {
        return Some(ShopCommand::SetShop(first_arg(text)));
    }
    if text.starts_with("!addadm") {
        return Some(ShopCommand::AddAdmin(first_arg(text).map(strip_mention)));
    }
    if text.starts_with("!remadm") {
        return Some(ShopCommand::RemoveAdmin(first_arg(text).map(strip_mention)));
    }
    if text.starts_with("!listadm") {
        return Some(ShopCommand::ListAdmins);
    }
    if text.starts_with("!removelisting") {
        return Some(ShopCommand::RemoveListing);
    }

    None
}

fn first_arg(text: &str) -> Option<String> {
    text.split_whitespace().nth(1).map(|s| s.to_string())
}

/// Accept both raw ids and `<@id>` / `<@!id>` mention forms.
fn strip_mention(arg: String) -> UserId {
    static MENTION_CHARS: OnceLock<Regex> = OnceLock::new();
    let re = MENTION_CHARS.get_or_init(|| Regex::new(r"[<@!>]").expect("static regex"));
    UserId::new(re.replace_all(&arg, "").into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_commands_parse() {
        assert_eq!(parse("!shop"), Some(ShopCommand::Shop));
        assert_eq!(parse("!clearshop"), Some(ShopCommand::ClearShop));
        assert_eq!(parse("!viewtrades"), Some(ShopCommand::ViewTrades));
        assert_eq!(parse("!listadm"), Some(ShopCommand::ListAdmins));
        assert_eq!(parse("!removelisting"), Some(ShopCommand::RemoveListing));
    }

    #[test]
    fn commands_are_case_sensitive() {
        assert_eq!(parse("!Shop"), None);
        assert_eq!(parse("!SHOP"), None);
    }

    #[test]
    fn setshop_distinguishes_missing_argument() {
        assert_eq!(parse("!setshop"), Some(ShopCommand::SetShop(None)));
        assert_eq!(
            parse("!setshop 112233"),
            Some(ShopCommand::SetShop(Some("112233".to_string())))
        );
    }

    #[test]
    fn admin_commands_accept_mentions_and_raw_ids() {
        assert_eq!(
            parse("!addadm <@!12345>"),
            Some(ShopCommand::AddAdmin(Some(UserId::new("12345"))))
        );
        assert_eq!(
            parse("!remadm 67890"),
            Some(ShopCommand::RemoveAdmin(Some(UserId::new("67890"))))
        );
        assert_eq!(parse("!addadm"), Some(ShopCommand::AddAdmin(None)));
    }

    #[test]
    fn plain_chatter_is_not_a_command() {
        assert_eq!(parse("hello there"), None);
        assert_eq!(parse("!unknown"), None);
    }
}
