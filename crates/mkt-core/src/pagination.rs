//! Single-page listing browser.
//!
//! Pure: same (catalog, kind, page) always yields the same view. Callers
//! reload the catalog before every render, so "Page X of N" can legitimately
//! change between two clicks on the same message.

use crate::{
    catalog::{Catalog, ListingKind},
    interaction::Action,
    view::{Button, ButtonStyle, Embed, Field, MessageView},
    Error, Result,
};

const COLOR_SALE: u32 = 0x00FF00;
const COLOR_TRADE: u32 = 0xFFD700;

/// Render one listing page. `page` indexes directly into the corresponding
/// sequence; out-of-range pages are NotFound (the listing may have been
/// removed since the buttons were drawn).
pub fn render(catalog: &Catalog, kind: ListingKind, page: usize) -> Result<MessageView> {
    match kind {
        ListingKind::Sale => render_sale(catalog, page),
        ListingKind::Trade => render_trade(catalog, page),
    }
}

fn render_sale(catalog: &Catalog, page: usize) -> Result<MessageView> {
    let total = catalog.sell.len();
    let item = catalog
        .sell
        .get(page)
        .ok_or_else(|| Error::NotFound("Item not found!".to_string()))?;

    let embed = Embed {
        title: Some(format!("🛒 Item for Sale - {}", item.name)),
        description: Some(page_label(page, total)),
        fields: vec![
            Field::new("💰 Price", &item.price, true),
            Field::new("📦 Stock", &item.stock, true),
            Field::new("👤 Seller", item.seller_id.mention(), true),
        ],
        footer: Some(format!("Item #{}", page + 1)),
        color: Some(COLOR_SALE),
        image: item.image.clone(),
        thumbnail: None,
    };

    let primary = Button::new(
        Action::ContactSeller(page).custom_id(),
        "Contact Seller",
        ButtonStyle::Success,
    )
    .emoji("📞");

    Ok(assemble(embed, primary, page, total, Action::BuyPage))
}

fn render_trade(catalog: &Catalog, page: usize) -> Result<MessageView> {
    let total = catalog.trade_offering.len();
    let item = catalog
        .trade_offering
        .get(page)
        .ok_or_else(|| Error::NotFound("Trade offer not found!".to_string()))?;

    let embed = Embed {
        title: Some(format!("🔄 Trade Offer - {}", item.item_name)),
        description: Some(page_label(page, total)),
        fields: vec![
            Field::new("📦 Offering", &item.item_name, false),
            Field::new("💭 Owner Wants", &item.want, false),
            Field::new("👤 Owner", item.user_id.mention(), true),
        ],
        footer: Some(format!("Trade #{}", page + 1)),
        color: Some(COLOR_TRADE),
        image: item.image.clone(),
        thumbnail: None,
    };

    let primary = Button::new(
        Action::MakeOffer(page).custom_id(),
        "Make an Offer",
        ButtonStyle::Primary,
    )
    .emoji("🤝");

    Ok(assemble(embed, primary, page, total, Action::TradePage))
}

fn page_label(page: usize, total: usize) -> String {
    format!("**Page {} of {}**", page + 1, total)
}

fn assemble(
    embed: Embed,
    primary: Button,
    page: usize,
    total: usize,
    nav_action: fn(usize) -> Action,
) -> MessageView {
    let mut rows = vec![vec![primary]];

    // Navigation row only exists with more than one page.
    if total > 1 {
        let mut nav = Vec::new();
        if page > 0 {
            nav.push(
                Button::new(
                    nav_action(page - 1).custom_id(),
                    "Previous",
                    ButtonStyle::Secondary,
                )
                .emoji("⬅️"),
            );
        }
        if page < total - 1 {
            nav.push(
                Button::new(
                    nav_action(page + 1).custom_id(),
                    "Next",
                    ButtonStyle::Secondary,
                )
                .emoji("➡️"),
            );
        }
        rows.push(nav);
    }

    MessageView {
        content: None,
        embed: Some(embed),
        rows,
    }
}
