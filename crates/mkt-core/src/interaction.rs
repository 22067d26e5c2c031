//! Component and modal custom-identifier scheme.
//!
//! Identifiers are underscore-delimited with embedded parameters
//! (`contact_seller_3`, `remove_listing_<userId>_<pos>`). Every embedded
//! index is advisory only: flows revalidate it against a freshly reloaded
//! catalog before acting, so a stale id fails with NotFound instead of
//! touching the wrong listing.

use crate::domain::UserId;

/// A parsed button click.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    OpenBuy,
    BuyPage(usize),
    OpenTradeMenu,
    OpenSellModal,
    LookFor,
    TradePage(usize),
    OpenTradingForModal,
    MakeOffer(usize),
    ContactSeller(usize),
    CloseTicket,
    AcceptTrade(UserId),
    DeclineTrade(UserId),
    CloseTradeChannel,
    RemoveListingMenu,
    AdminRemoveMenu,
    RemoveListing { owner: UserId, position: usize },
    AdminRemoveItem(usize),
}

impl Action {
    /// Parse a component custom id. Unknown or garbled ids yield `None` and
    /// are ignored upstream.
    pub fn parse(id: &str) -> Option<Action> {
        match id {
            "buy" => return Some(Action::OpenBuy),
            "trade" => return Some(Action::OpenTradeMenu),
            "sell" => return Some(Action::OpenSellModal),
            "look_for" => return Some(Action::LookFor),
            "trading_for" => return Some(Action::OpenTradingForModal),
            "close_ticket" => return Some(Action::CloseTicket),
            "close_trade_channel" => return Some(Action::CloseTradeChannel),
            "remove_listing_menu" => return Some(Action::RemoveListingMenu),
            "admin_remove_menu" => return Some(Action::AdminRemoveMenu),
            _ => {}
        }

        if let Some(rest) = id.strip_prefix("buy_page_") {
            return rest.parse().ok().map(Action::BuyPage);
        }
        if let Some(rest) = id.strip_prefix("trade_page_") {
            return rest.parse().ok().map(Action::TradePage);
        }
        if let Some(rest) = id.strip_prefix("make_offer_") {
            return rest.parse().ok().map(Action::MakeOffer);
        }
        if let Some(rest) = id.strip_prefix("contact_seller_") {
            return rest.parse().ok().map(Action::ContactSeller);
        }
        if let Some(rest) = id.strip_prefix("accept_trade_") {
            return Some(Action::AcceptTrade(UserId::new(rest)));
        }
        if let Some(rest) = id.strip_prefix("decline_trade_") {
            return Some(Action::DeclineTrade(UserId::new(rest)));
        }
        if let Some(rest) = id.strip_prefix("admin_remove_item_") {
            return rest.parse().ok().map(Action::AdminRemoveItem);
        }
        if let Some(rest) = id.strip_prefix("remove_listing_") {
            // `remove_listing_<userId>_<pos>`; the user id is part of the
            // token so a shared/copied button cannot act for someone else.
            let (owner, pos) = rest.rsplit_once('_')?;
            let position = pos.parse().ok()?;
            return Some(Action::RemoveListing {
                owner: UserId::new(owner),
                position,
            });
        }

        None
    }

    pub fn custom_id(&self) -> String {
        match self {
            Action::OpenBuy => "buy".to_string(),
            Action::BuyPage(page) => format!("buy_page_{page}"),
            Action::OpenTradeMenu => "trade".to_string(),
            Action::OpenSellModal => "sell".to_string(),
            Action::LookFor => "look_for".to_string(),
            Action::TradePage(page) => format!("trade_page_{page}"),
            Action::OpenTradingForModal => "trading_for".to_string(),
            Action::MakeOffer(idx) => format!("make_offer_{idx}"),
            Action::ContactSeller(idx) => format!("contact_seller_{idx}"),
            Action::CloseTicket => "close_ticket".to_string(),
            Action::AcceptTrade(user) => format!("accept_trade_{user}"),
            Action::DeclineTrade(user) => format!("decline_trade_{user}"),
            Action::CloseTradeChannel => "close_trade_channel".to_string(),
            Action::RemoveListingMenu => "remove_listing_menu".to_string(),
            Action::AdminRemoveMenu => "admin_remove_menu".to_string(),
            Action::RemoveListing { owner, position } => {
                format!("remove_listing_{owner}_{position}")
            }
            Action::AdminRemoveItem(position) => format!("admin_remove_item_{position}"),
        }
    }
}

/// A parsed modal submission id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalKind {
    Sell,
    TradingFor,
    Offer(usize),
}

impl ModalKind {
    pub fn parse(id: &str) -> Option<ModalKind> {
        match id {
            "sell_modal" => return Some(ModalKind::Sell),
            "trading_for_modal" => return Some(ModalKind::TradingFor),
            _ => {}
        }
        if let Some(rest) = id.strip_prefix("offer_modal_") {
            return rest.parse().ok().map(ModalKind::Offer);
        }
        None
    }

    pub fn custom_id(&self) -> String {
        match self {
            ModalKind::Sell => "sell_modal".to_string(),
            ModalKind::TradingFor => "trading_for_modal".to_string(),
            ModalKind::Offer(idx) => format!("offer_modal_{idx}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_action() {
        let actions = vec![
            Action::OpenBuy,
            Action::BuyPage(3),
            Action::OpenTradeMenu,
            Action::OpenSellModal,
            Action::LookFor,
            Action::TradePage(0),
            Action::OpenTradingForModal,
            Action::MakeOffer(7),
            Action::ContactSeller(2),
            Action::CloseTicket,
            Action::AcceptTrade(UserId::new("123")),
            Action::DeclineTrade(UserId::new("456")),
            Action::CloseTradeChannel,
            Action::RemoveListingMenu,
            Action::AdminRemoveMenu,
            Action::RemoveListing {
                owner: UserId::new("789"),
                position: 4,
            },
            Action::AdminRemoveItem(1),
        ];
        for action in actions {
            assert_eq!(Action::parse(&action.custom_id()), Some(action));
        }
    }

    #[test]
    fn menu_id_is_not_mistaken_for_a_removal_token() {
        assert_eq!(
            Action::parse("remove_listing_menu"),
            Some(Action::RemoveListingMenu)
        );
    }

    #[test]
    fn garbled_ids_parse_to_none() {
        assert_eq!(Action::parse("buy_page_"), None);
        assert_eq!(Action::parse("buy_page_x"), None);
        assert_eq!(Action::parse("remove_listing_42"), None);
        assert_eq!(Action::parse("askuser:1:2"), None);
        assert_eq!(Action::parse(""), None);
    }

    #[test]
    fn modal_ids_round_trip() {
        for kind in [ModalKind::Sell, ModalKind::TradingFor, ModalKind::Offer(9)] {
            assert_eq!(ModalKind::parse(&kind.custom_id()), Some(kind));
        }
        assert_eq!(ModalKind::parse("offer_modal_"), None);
    }
}
