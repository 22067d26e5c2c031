//! The marketplace engine: command/interaction flows and the
//! negotiation-channel state machine.
//!
//! Channel lifecycle is NONE → CREATED → ACTIVE → CLOSING → DELETED. Purchase
//! tickets are ACTIVE from creation; trade negotiations start pending and
//! need the owner's accept (grant + timer) or decline (grace deletion, no
//! timer ever). Close cancels the timer first, then schedules deletion after
//! a short grace delay. Grace deletions are fire-and-forget: failures are
//! logged, never retried.
//!
//! Every flow reloads the catalog before trusting an embedded index, so a
//! click on a stale button fails with NotFound instead of acting on the
//! wrong listing.

use std::{collections::HashMap, sync::Arc, time::Duration};

use crate::{
    access::{is_owner, is_privileged},
    catalog::{normalize_image, ListingKind, SaleListing, TradeListing},
    command::ShopCommand,
    config::{Config, BUTTONS_PER_ROW},
    domain::{Actor, CategoryId, ChannelId, GuildRef, UserId},
    interaction::{Action, ModalKind},
    pagination,
    ports::{ChannelHost, ChannelSpec},
    reminders::ReminderRegistry,
    removal::{removable_view, resolve_removal, RemovalScope, Removed},
    settings::BotSettings,
    store::ShopStore,
    view::{Button, ButtonStyle, Embed, Field, InputStyle, MessageView, ModalInput, ModalView, Response},
    Error, Result,
};

pub const TICKET_PREFIX: &str = "ticket-";
pub const TRADE_PREFIX: &str = "trade-";

/// Where an inbound event happened.
#[derive(Clone, Debug)]
pub struct EventCtx {
    pub actor: Actor,
    pub guild: GuildRef,
    pub channel: ChannelId,
}

/// Modal submission fields keyed by input custom id.
#[derive(Clone, Debug, Default)]
pub struct ModalFields(pub HashMap<String, String>);

impl ModalFields {
    pub fn get(&self, id: &str) -> &str {
        self.0.get(id).map(String::as_str).unwrap_or("")
    }
}

pub struct Shop {
    cfg: Arc<Config>,
    store: ShopStore,
    host: Arc<dyn ChannelHost>,
    reminders: ReminderRegistry,
}

impl Shop {
    pub fn new(
        cfg: Arc<Config>,
        store: ShopStore,
        host: Arc<dyn ChannelHost>,
        reminders: ReminderRegistry,
    ) -> Self {
        Self {
            cfg,
            store,
            host,
            reminders,
        }
    }

    pub fn reminders(&self) -> &ReminderRegistry {
        &self.reminders
    }

    /// Any message in a negotiation channel counts as activity and resets
    /// that channel's idle timer.
    pub async fn note_message(&self, channel: ChannelId, channel_name: &str) {
        if channel_name.starts_with(TICKET_PREFIX) || channel_name.starts_with(TRADE_PREFIX) {
            self.reminders.reset(channel).await;
        }
    }

    // === Text commands ===

    pub async fn handle_command(&self, ctx: &EventCtx, cmd: ShopCommand) -> Result<Response> {
        match cmd {
            ShopCommand::Shop => {
                if !self.actor_is_privileged(&ctx.actor).await {
                    return Ok(Response::Say(NEED_ADMIN.to_string()));
                }
                Ok(Response::Post(shop_menu()))
            }
            ShopCommand::ClearShop => {
                if !self.actor_is_privileged(&ctx.actor).await {
                    return Ok(Response::Say(NEED_ADMIN.to_string()));
                }
                self.store.save_catalog(&Default::default()).await?;
                Ok(Response::Say(
                    "✅ All shop listings have been cleared!".to_string(),
                ))
            }
            ShopCommand::ViewTrades => {
                let catalog = self.store.catalog().await?;
                Ok(Response::Post(view_trades(&catalog)))
            }
            ShopCommand::SetChannel => {
                if !self.actor_is_privileged(&ctx.actor).await {
                    return Ok(Response::Say(NEED_ADMIN.to_string()));
                }
                let mut settings = self.store.settings().await?;
                settings.announcement_channel = Some(ctx.channel);
                self.store.save_settings(&settings).await?;
                Ok(Response::Say(
                    "✅ This channel will now receive shop and trade announcements!".to_string(),
                ))
            }
            ShopCommand::SetShop(arg) => self.set_shop(ctx, arg).await,
            ShopCommand::AddAdmin(arg) => self.add_admin(ctx, arg).await,
            ShopCommand::RemoveAdmin(arg) => self.remove_admin(ctx, arg).await,
            ShopCommand::ListAdmins => self.list_admins(ctx).await,
            ShopCommand::RemoveListing => Ok(Response::Say(
                "💡 Please use the **Remove Listing** button in `!shop` instead!".to_string(),
            )),
        }
    }

    async fn set_shop(&self, ctx: &EventCtx, arg: Option<String>) -> Result<Response> {
        if !self.actor_is_privileged(&ctx.actor).await {
            return Ok(Response::Say(NEED_ADMIN.to_string()));
        }
        let Some(raw_id) = arg else {
            return Ok(Response::Say(
                "❌ Usage: `!setshop <category_id>`\n\nTo get category ID:\n1. Enable Developer Mode (User Settings > Advanced)\n2. Right-click a category > Copy ID".to_string(),
            ));
        };

        let category_name = match self.host.resolve_category(&raw_id).await {
            Ok(Some(name)) => name,
            Ok(None) => return Ok(Response::Say("❌ That ID is not a category!".to_string())),
            Err(_) => {
                return Ok(Response::Say(
                    "❌ Invalid category ID! Make sure you copied it correctly.".to_string(),
                ))
            }
        };
        let Ok(id) = raw_id.parse::<u64>() else {
            return Ok(Response::Say(
                "❌ Invalid category ID! Make sure you copied it correctly.".to_string(),
            ));
        };

        let mut settings = self.store.settings().await?;
        settings.shop_category = Some(CategoryId(id));
        self.store.save_settings(&settings).await?;

        Ok(Response::Say(format!(
            "✅ Tickets will now be created in the **{category_name}** category!"
        )))
    }

    async fn add_admin(&self, ctx: &EventCtx, arg: Option<UserId>) -> Result<Response> {
        if !is_owner(&ctx.actor, &self.cfg.owner_id) {
            return Ok(Response::Say(OWNER_ONLY.to_string()));
        }
        let Some(user) = arg else {
            return Ok(Response::Say(
                "❌ Usage: `!addadm <user_id>` or `!addadm @user`".to_string(),
            ));
        };

        let mut settings = self.store.settings().await?;
        if !settings.add_admin(user.clone()) {
            return Ok(Response::Say(
                "❌ That user is already a bot admin!".to_string(),
            ));
        }
        self.store.save_settings(&settings).await?;

        Ok(Response::Say(format!(
            "✅ {} is now a bot admin! They can now use admin commands.",
            user.mention()
        )))
    }

    async fn remove_admin(&self, ctx: &EventCtx, arg: Option<UserId>) -> Result<Response> {
        if !is_owner(&ctx.actor, &self.cfg.owner_id) {
            return Ok(Response::Say(OWNER_ONLY.to_string()));
        }
        let Some(user) = arg else {
            return Ok(Response::Say(
                "❌ Usage: `!remadm <user_id>` or `!remadm @user`".to_string(),
            ));
        };

        let mut settings = self.store.settings().await?;
        if !settings.remove_admin(&user) {
            return Ok(Response::Say("❌ That user is not a bot admin!".to_string()));
        }
        self.store.save_settings(&settings).await?;

        Ok(Response::Say(format!(
            "✅ {} is no longer a bot admin.",
            user.mention()
        )))
    }

    async fn list_admins(&self, ctx: &EventCtx) -> Result<Response> {
        if !is_owner(&ctx.actor, &self.cfg.owner_id) {
            return Ok(Response::Say(OWNER_ONLY.to_string()));
        }

        let settings = self.store.settings().await?;
        if settings.admins.is_empty() {
            return Ok(Response::Say(
                "📋 There are no bot admins set yet.".to_string(),
            ));
        }

        let listed = settings
            .admins
            .iter()
            .map(|id| format!("• {}", id.mention()))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Response::Post(MessageView {
            embed: Some(Embed {
                title: Some("🛡️ Bot Admins".to_string()),
                description: Some(listed),
                footer: Some(format!("Total: {}", settings.admins.len())),
                color: Some(0x0099FF),
                ..Embed::default()
            }),
            ..MessageView::default()
        }))
    }

    // === Button interactions ===

    pub async fn handle_action(&self, ctx: &EventCtx, action: Action) -> Result<Response> {
        match action {
            Action::OpenBuy => {
                let catalog = self.store.catalog().await?;
                if catalog.sell.is_empty() {
                    return Ok(Response::Ephemeral(
                        "No items available for sale yet!".to_string(),
                    ));
                }
                Ok(Response::Page {
                    view: pagination::render(&catalog, ListingKind::Sale, 0)?,
                    update: false,
                })
            }
            Action::BuyPage(page) => {
                let catalog = self.store.catalog().await?;
                Ok(Response::Page {
                    view: pagination::render(&catalog, ListingKind::Sale, page)?,
                    update: true,
                })
            }
            Action::OpenTradeMenu => Ok(Response::EphemeralView(MessageView {
                content: Some("Choose a trade option:".to_string()),
                rows: vec![vec![
                    Button::new(
                        Action::LookFor.custom_id(),
                        "Look For",
                        ButtonStyle::Success,
                    ),
                    Button::new(
                        Action::OpenTradingForModal.custom_id(),
                        "Trading For",
                        ButtonStyle::Primary,
                    ),
                ]],
                ..MessageView::default()
            })),
            Action::OpenSellModal => Ok(Response::Modal(sell_modal())),
            Action::LookFor => {
                let catalog = self.store.catalog().await?;
                if catalog.trade_offering.is_empty() {
                    return Ok(Response::Ephemeral(
                        "No trade offers available yet!".to_string(),
                    ));
                }
                Ok(Response::Page {
                    view: pagination::render(&catalog, ListingKind::Trade, 0)?,
                    update: false,
                })
            }
            Action::TradePage(page) => {
                let catalog = self.store.catalog().await?;
                Ok(Response::Page {
                    view: pagination::render(&catalog, ListingKind::Trade, page)?,
                    update: true,
                })
            }
            Action::OpenTradingForModal => Ok(Response::Modal(trading_for_modal())),
            Action::MakeOffer(index) => {
                let catalog = self.store.catalog().await?;
                let offer = catalog
                    .trade_offering
                    .get(index)
                    .ok_or_else(|| Error::NotFound("Trade offer not found!".to_string()))?;
                Ok(Response::Modal(offer_modal(index, offer)))
            }
            Action::ContactSeller(index) => self.open_purchase_ticket(ctx, index).await,
            Action::CloseTicket => self.close_channel(ctx, "ticket").await,
            Action::CloseTradeChannel => self.close_channel(ctx, "trade channel").await,
            Action::AcceptTrade(offerer) => self.accept_trade(ctx, offerer).await,
            Action::DeclineTrade(_) => self.decline_trade(ctx).await,
            Action::RemoveListingMenu => self.removal_panel_own(ctx).await,
            Action::AdminRemoveMenu => self.removal_panel_admin(ctx).await,
            Action::RemoveListing { owner, position } => {
                self.remove_own_listing(ctx, owner, position).await
            }
            Action::AdminRemoveItem(position) => self.admin_remove_item(ctx, position).await,
        }
    }

    // === Modal submissions ===

    pub async fn handle_modal(
        &self,
        ctx: &EventCtx,
        kind: ModalKind,
        fields: &ModalFields,
    ) -> Result<Response> {
        match kind {
            ModalKind::Sell => self.submit_sale(ctx, fields).await,
            ModalKind::TradingFor => self.submit_trade_listing(ctx, fields).await,
            ModalKind::Offer(index) => self.submit_offer(ctx, index, fields).await,
        }
    }

    async fn submit_sale(&self, ctx: &EventCtx, fields: &ModalFields) -> Result<Response> {
        let image = normalize_image(fields.get("image_url"));
        let listing = SaleListing {
            name: fields.get("item_name").to_string(),
            price: fields.get("price").to_string(),
            stock: fields.get("stock").to_string(),
            seller_id: ctx.actor.id.clone(),
            seller_name: ctx.actor.name.clone(),
            image,
        };

        let mut catalog = self.store.catalog().await?;
        // Validation failure rejects the submission before any mutation.
        let index = catalog.push_sale(listing.clone())?;
        self.store.save_catalog(&catalog).await?;

        self.announce(MessageView {
            embed: Some(Embed {
                title: Some("🆕 New Item for Sale!".to_string()),
                description: Some(format!("**{}** is now available!", listing.name)),
                color: Some(0x00FF00),
                fields: vec![
                    Field::new("💰 Price", &listing.price, true),
                    Field::new("📦 Stock", &listing.stock, true),
                    Field::new("👤 Seller", ctx.actor.id.mention(), true),
                ],
                image: listing.image.clone(),
                ..Embed::default()
            }),
            rows: vec![vec![Button::new(
                Action::ContactSeller(index).custom_id(),
                "Contact Seller",
                ButtonStyle::Success,
            )
            .emoji("📞")]],
            ..MessageView::default()
        })
        .await;

        Ok(Response::EphemeralView(MessageView {
            embed: Some(Embed {
                title: Some("✅ Item Listed for Sale!".to_string()),
                color: Some(0x00FF00),
                fields: vec![
                    Field::new("Item", &listing.name, false),
                    Field::new("Price", &listing.price, true),
                    Field::new("Stock", &listing.stock, true),
                ],
                image: listing.image,
                ..Embed::default()
            }),
            ..MessageView::default()
        }))
    }

    async fn submit_trade_listing(&self, ctx: &EventCtx, fields: &ModalFields) -> Result<Response> {
        let image = normalize_image(fields.get("image_url"));
        let listing = TradeListing {
            item_name: fields.get("item_name").to_string(),
            want: fields.get("want").to_string(),
            user_id: ctx.actor.id.clone(),
            user_name: ctx.actor.name.clone(),
            image,
        };

        let mut catalog = self.store.catalog().await?;
        let index = catalog.push_trade(listing.clone())?;
        self.store.save_catalog(&catalog).await?;

        self.announce(MessageView {
            embed: Some(Embed {
                title: Some("🔄 New Trade Offer!".to_string()),
                description: Some(format!("**{}** is available for trade!", listing.item_name)),
                color: Some(0x0099FF),
                fields: vec![
                    Field::new("📦 Offering", &listing.item_name, false),
                    Field::new("💭 Looking For", &listing.want, false),
                    Field::new("👤 Trader", ctx.actor.id.mention(), false),
                ],
                image: listing.image.clone(),
                ..Embed::default()
            }),
            rows: vec![vec![Button::new(
                Action::MakeOffer(index).custom_id(),
                "Make an Offer",
                ButtonStyle::Primary,
            )
            .emoji("🤝")]],
            ..MessageView::default()
        })
        .await;

        Ok(Response::EphemeralView(MessageView {
            embed: Some(Embed {
                title: Some("✅ Trade Listing Created!".to_string()),
                color: Some(0x0099FF),
                fields: vec![
                    Field::new("Trading", &listing.item_name, false),
                    Field::new("Looking For", &listing.want, false),
                ],
                image: listing.image,
                ..Embed::default()
            }),
            ..MessageView::default()
        }))
    }

    /// Offer submission: create the pending trade channel, visible to the
    /// listing owner (and staff) but not yet to the offerer.
    async fn submit_offer(
        &self,
        ctx: &EventCtx,
        index: usize,
        fields: &ModalFields,
    ) -> Result<Response> {
        let catalog = self.store.catalog().await?;
        let offer = catalog
            .trade_offering
            .get(index)
            .ok_or_else(|| Error::NotFound("Trade offer not found!".to_string()))?;
        let your_offer = fields.get("your_offer").to_string();

        let settings = self.settings_or_default().await;
        let spec = ChannelSpec {
            guild: ctx.guild,
            name: negotiation_channel_name(TRADE_PREFIX, &ctx.actor.name),
            topic: format!("Trade Confirmation - {}", offer.item_name),
            category: settings.shop_category,
            allow: vec![offer.user_id.clone()],
            include_admin_role: true,
        };

        let channel = match self.host.create_private_channel(spec).await {
            Ok(channel) => channel,
            Err(e) => {
                eprintln!("[TICKET] Failed to create trade channel: {e}");
                return Ok(Response::Ephemeral(
                    "❌ Failed to create trade channel. Make sure the bot has permission to create channels!".to_string(),
                ));
            }
        };

        let pending = MessageView {
            content: Some(offer.user_id.mention()),
            embed: Some(Embed {
                title: Some("🤝 Trade Offer Pending".to_string()),
                description: Some(format!(
                    "{}, someone wants to trade with you!",
                    offer.user_id.mention()
                )),
                color: Some(0xFFD700),
                fields: vec![
                    Field::new("📦 Your Item", &offer.item_name, true),
                    Field::new("💭 You Want", &offer.want, true),
                    Field::new(format!("🎁 Offer from {}", ctx.actor.name), &your_offer, false),
                ],
                footer: Some("Item owner: Accept or decline this offer".to_string()),
                ..Embed::default()
            }),
            rows: vec![vec![
                Button::new(
                    Action::AcceptTrade(ctx.actor.id.clone()).custom_id(),
                    "Accept Offer",
                    ButtonStyle::Success,
                )
                .emoji("✅"),
                Button::new(
                    Action::DeclineTrade(ctx.actor.id.clone()).custom_id(),
                    "Decline Offer",
                    ButtonStyle::Danger,
                )
                .emoji("❌"),
            ]],
        };
        if let Err(e) = self.host.send_message(channel, pending).await {
            eprintln!("[TICKET] Failed to post pending trade offer: {e}");
        }

        // Pending: no reminder timer until the owner accepts.
        Ok(Response::Ephemeral(format!(
            "✅ Your offer has been sent! Wait for the owner to respond in {}",
            channel.link()
        )))
    }

    // === Negotiation channel state machine ===

    /// Purchase tickets are ACTIVE immediately: both participants are in
    /// from the start and the reminder timer begins at creation.
    async fn open_purchase_ticket(&self, ctx: &EventCtx, index: usize) -> Result<Response> {
        let catalog = self.store.catalog().await?;
        let item = catalog
            .sell
            .get(index)
            .ok_or_else(|| Error::NotFound("Item not found!".to_string()))?;

        let settings = self.settings_or_default().await;
        let spec = ChannelSpec {
            guild: ctx.guild,
            name: negotiation_channel_name(TICKET_PREFIX, &ctx.actor.name),
            topic: format!(
                "Ticket for {} - Buyer: {} | Seller: {}",
                item.name, ctx.actor.name, item.seller_name
            ),
            category: settings.shop_category,
            allow: vec![ctx.actor.id.clone(), item.seller_id.clone()],
            include_admin_role: false,
        };

        // Creation failure leaves no partial state: no timer, no catalog
        // mutation, just a recoverable error back to the buyer.
        let channel = match self.host.create_private_channel(spec).await {
            Ok(channel) => channel,
            Err(e) => {
                eprintln!("[TICKET] Failed to create ticket: {e}");
                return Ok(Response::Ephemeral(
                    "❌ Failed to create ticket. Make sure the bot has permission to create channels!".to_string(),
                ));
            }
        };

        let opening = MessageView {
            content: Some(format!(
                "{} {}",
                ctx.actor.id.mention(),
                item.seller_id.mention()
            )),
            embed: Some(Embed {
                title: Some("🎫 Purchase Ticket Created".to_string()),
                description: Some(format!(
                    "**Item:** {}\n**Price:** {}\n**Stock:** {}",
                    item.name, item.price, item.stock
                )),
                color: Some(0x00FF00),
                fields: vec![
                    Field::new("👤 Buyer", ctx.actor.id.mention(), true),
                    Field::new("🏪 Seller", item.seller_id.mention(), true),
                ],
                footer: Some(REMINDER_FOOTER.to_string()),
                thumbnail: item.image.clone(),
                ..Embed::default()
            }),
            rows: vec![vec![Button::new(
                Action::CloseTicket.custom_id(),
                "Close Ticket",
                ButtonStyle::Danger,
            )
            .emoji("🔒")]],
        };
        if let Err(e) = self.host.send_message(channel, opening).await {
            eprintln!("[TICKET] Failed to post ticket opening message: {e}");
        }

        self.reminders
            .start(channel, ctx.actor.id.clone(), item.seller_id.clone())
            .await;

        Ok(Response::Ephemeral(format!(
            "✅ Ticket created! Go to {} to talk with the seller.",
            channel.link()
        )))
    }

    /// Owner accepted a pending trade: let the offerer in, confirm, and
    /// start the idle timer (pending → ACTIVE).
    async fn accept_trade(&self, ctx: &EventCtx, offerer: UserId) -> Result<Response> {
        match self.host.grant_access(ctx.channel, &offerer).await {
            Ok(()) => {
                let confirm = MessageView {
                    embed: Some(Embed {
                        title: Some("✅ Trade Accepted!".to_string()),
                        description: Some(format!(
                            "{} has been added to the channel. Please discuss and complete your trade here.",
                            offerer.mention()
                        )),
                        color: Some(0x00FF00),
                        footer: Some(REMINDER_FOOTER.to_string()),
                        ..Embed::default()
                    }),
                    rows: vec![vec![Button::new(
                        Action::CloseTradeChannel.custom_id(),
                        "Close Trade Channel",
                        ButtonStyle::Danger,
                    )
                    .emoji("🔒")]],
                    ..MessageView::default()
                };
                if let Err(e) = self.host.send_message(ctx.channel, confirm).await {
                    eprintln!("[TICKET] Failed to post trade confirmation: {e}");
                }

                self.reminders
                    .start(ctx.channel, offerer.clone(), ctx.actor.id.clone())
                    .await;
            }
            Err(e) => {
                eprintln!("[TICKET] Failed to add offerer to channel: {e}");
            }
        }

        Ok(Response::Rewrite(format!(
            "✅ Trade accepted! {} you can now join this channel to finalize the trade.",
            offerer.mention()
        )))
    }

    /// Owner declined a pending trade: no permission grant, no timer ever;
    /// just the grace-delayed deletion.
    async fn decline_trade(&self, ctx: &EventCtx) -> Result<Response> {
        let grace = self.cfg.decline_grace;
        self.schedule_delete(ctx.channel, grace);
        Ok(Response::Rewrite(format!(
            "❌ Trade declined. This channel will close in {} seconds.",
            grace.as_secs()
        )))
    }

    /// ACTIVE → CLOSING: cancel the timer before anything else so it cannot
    /// fire into a channel that is about to disappear.
    async fn close_channel(&self, ctx: &EventCtx, label: &str) -> Result<Response> {
        self.reminders.cancel(ctx.channel).await;
        let grace = self.cfg.close_grace;
        self.schedule_delete(ctx.channel, grace);
        Ok(Response::Say(format!(
            "🔒 Closing {label} in {} seconds...",
            grace.as_secs()
        )))
    }

    fn schedule_delete(&self, channel: ChannelId, grace: Duration) {
        let host = self.host.clone();
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            if let Err(e) = host.delete_channel(channel).await {
                eprintln!("[TICKET] Failed to delete channel {}: {e}", channel.0);
            }
        });
    }

    // === Removal panels ===

    async fn removal_panel_own(&self, ctx: &EventCtx) -> Result<Response> {
        let catalog = self.store.catalog().await?;
        let scope = RemovalScope::Own(ctx.actor.id.clone());
        let entries = removable_view(&catalog, &scope);
        if entries.is_empty() {
            return Ok(Response::Ephemeral(
                "❌ You don't have any active listings!".to_string(),
            ));
        }

        Ok(Response::EphemeralView(removal_panel(
            "Your Active Listings",
            "Click the number button to remove that listing",
            &entries,
            |position| Action::RemoveListing {
                owner: ctx.actor.id.clone(),
                position,
            },
        )))
    }

    async fn removal_panel_admin(&self, ctx: &EventCtx) -> Result<Response> {
        if !self.actor_is_privileged(&ctx.actor).await {
            return Err(Error::Forbidden(
                "Only admins can use this feature!".to_string(),
            ));
        }

        let catalog = self.store.catalog().await?;
        let entries = removable_view(&catalog, &RemovalScope::Admin);
        if entries.is_empty() {
            return Ok(Response::Ephemeral(
                "❌ There are no active listings!".to_string(),
            ));
        }

        Ok(Response::EphemeralView(removal_panel(
            "🛡️ All Active Listings (Admin)",
            "Click the number button to remove any listing",
            &entries,
            Action::AdminRemoveItem,
        )))
    }

    async fn remove_own_listing(
        &self,
        ctx: &EventCtx,
        owner: UserId,
        position: usize,
    ) -> Result<Response> {
        // The selection token encodes who the panel was rendered for; a
        // copied button must not act for someone else.
        if owner != ctx.actor.id {
            return Err(Error::Forbidden(
                "You can only remove your own listings!".to_string(),
            ));
        }

        let mut catalog = self.store.catalog().await?;
        let removed = resolve_removal(
            &mut catalog,
            &RemovalScope::Own(ctx.actor.id.clone()),
            position,
        )?;
        self.store.save_catalog(&catalog).await?;

        let text = match removed.kind() {
            ListingKind::Sale => {
                format!("✅ Removed **{}** from sale listings!", removed.display_name())
            }
            ListingKind::Trade => format!(
                "✅ Removed **{}** from trade listings!",
                removed.display_name()
            ),
        };
        Ok(Response::EphemeralClear(text))
    }

    async fn admin_remove_item(&self, ctx: &EventCtx, position: usize) -> Result<Response> {
        if !self.actor_is_privileged(&ctx.actor).await {
            return Err(Error::Forbidden(
                "Only admins can use this feature!".to_string(),
            ));
        }

        let mut catalog = self.store.catalog().await?;
        let removed = resolve_removal(&mut catalog, &RemovalScope::Admin, position)?;
        self.store.save_catalog(&catalog).await?;

        let text = match removed.kind() {
            ListingKind::Sale => format!(
                "✅ Removed **{}** by {} from sale listings!",
                removed.display_name(),
                removed.owner().mention()
            ),
            ListingKind::Trade => format!(
                "✅ Removed **{}** by {} from trade listings!",
                removed.display_name(),
                removed.owner().mention()
            ),
        };
        Ok(Response::EphemeralClear(text))
    }

    // === Helpers ===

    async fn actor_is_privileged(&self, actor: &Actor) -> bool {
        let settings = match self.store.settings().await {
            Ok(s) => Some(s),
            Err(e) => {
                // Fail closed to the platform-admin-or-owner check.
                eprintln!("[SHOP] Failed to load settings for privilege check: {e}");
                None
            }
        };
        is_privileged(actor, settings.as_ref(), &self.cfg.owner_id)
    }

    async fn settings_or_default(&self) -> BotSettings {
        match self.store.settings().await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("[SHOP] Failed to load settings: {e}");
                BotSettings::default()
            }
        }
    }

    /// Best-effort announcement post; failures never fail the triggering
    /// flow.
    async fn announce(&self, message: MessageView) {
        let settings = self.settings_or_default().await;
        let Some(channel) = settings.announcement_channel else {
            return;
        };
        if let Err(e) = self.host.send_message(channel, message).await {
            eprintln!("[SHOP] Failed to post announcement: {e}");
        }
    }
}

const NEED_ADMIN: &str = "❌ You need administrator permissions to use this command!";
const OWNER_ONLY: &str = "❌ Only the bot owner can use this command!";
const REMINDER_FOOTER: &str = "You will receive a reminder every 24 hours if no one chats";

/// `ticket-<name>-<millis>` / `trade-<name>-<millis>`, lowercased and
/// restricted to `[a-z0-9-]` (platform channel-name rules).
fn negotiation_channel_name(prefix: &str, user_name: &str) -> String {
    let raw = format!(
        "{prefix}{user_name}-{}",
        chrono::Utc::now().timestamp_millis()
    );
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

fn shop_menu() -> MessageView {
    MessageView {
        embed: Some(Embed {
            title: Some("🏪 Shop & Trade System".to_string()),
            description: Some("Choose an option below:".to_string()),
            color: Some(0x0099FF),
            fields: vec![
                Field::new("🟢 Buy", "Browse items for sale", false),
                Field::new("🔵 Trade", "Trade items with other players", false),
                Field::new("🔴 Sell", "List your items for sale", false),
                Field::new("🗑️ Remove Listing", "Remove your items from shop", false),
                Field::new(
                    "🛡️ Remove (Admin)",
                    "Remove any item from shop (Admin only)",
                    false,
                ),
            ],
            ..Embed::default()
        }),
        rows: vec![
            vec![
                Button::new(Action::OpenBuy.custom_id(), "Buy", ButtonStyle::Success),
                Button::new(
                    Action::OpenTradeMenu.custom_id(),
                    "Trade",
                    ButtonStyle::Primary,
                ),
                Button::new(
                    Action::OpenSellModal.custom_id(),
                    "Sell",
                    ButtonStyle::Danger,
                ),
            ],
            vec![
                Button::new(
                    Action::RemoveListingMenu.custom_id(),
                    "Remove Listing",
                    ButtonStyle::Secondary,
                )
                .emoji("🗑️"),
                Button::new(
                    Action::AdminRemoveMenu.custom_id(),
                    "Remove (Admin)",
                    ButtonStyle::Danger,
                )
                .emoji("🛡️"),
            ],
        ],
        ..MessageView::default()
    }
}

fn view_trades(catalog: &crate::catalog::Catalog) -> MessageView {
    let mut embed = Embed {
        title: Some("📋 Active Trade Offers".to_string()),
        color: Some(0xFFD700),
        ..Embed::default()
    };

    if catalog.trade_offering.is_empty() {
        embed.description = Some("No active trades yet!".to_string());
    } else {
        let listed = catalog
            .trade_offering
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                format!(
                    "{}. **{}** → wants: {} ({})",
                    idx + 1,
                    item.item_name,
                    item.want,
                    item.user_id.mention()
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        embed.fields.push(Field::new("🔄 Trading For", listed, false));
    }

    MessageView {
        embed: Some(embed),
        ..MessageView::default()
    }
}

fn removal_panel(
    title: &str,
    description: &str,
    entries: &[crate::removal::RemovableEntry],
    action: impl Fn(usize) -> Action,
) -> MessageView {
    let fields = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            Field::new(
                format!("{}. {}", idx + 1, entry.title),
                entry.details.clone(),
                false,
            )
        })
        .collect();

    let rows = entries
        .chunks(BUTTONS_PER_ROW)
        .enumerate()
        .map(|(row_idx, chunk)| {
            chunk
                .iter()
                .enumerate()
                .map(|(col_idx, _)| {
                    let position = row_idx * BUTTONS_PER_ROW + col_idx;
                    Button::new(
                        action(position).custom_id(),
                        (position + 1).to_string(),
                        ButtonStyle::Danger,
                    )
                })
                .collect()
        })
        .collect();

    MessageView {
        embed: Some(Embed {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            color: Some(0xFF0000),
            fields,
            ..Embed::default()
        }),
        rows,
        ..MessageView::default()
    }
}

fn sell_modal() -> ModalView {
    ModalView {
        id: ModalKind::Sell.custom_id(),
        title: "List Item for Sale".to_string(),
        inputs: vec![
            ModalInput {
                id: "item_name".to_string(),
                label: "Name of Item".to_string(),
                placeholder: "Enter item name...".to_string(),
                style: InputStyle::Short,
                required: true,
            },
            ModalInput {
                id: "price".to_string(),
                label: "Price".to_string(),
                placeholder: "Enter price (e.g., 1000 coins)...".to_string(),
                style: InputStyle::Short,
                required: true,
            },
            ModalInput {
                id: "stock".to_string(),
                label: "Stock".to_string(),
                placeholder: "Enter quantity available...".to_string(),
                style: InputStyle::Short,
                required: true,
            },
            ModalInput {
                id: "image_url".to_string(),
                label: "Image URL (Optional)".to_string(),
                placeholder: "Upload image to Discord, right-click, Copy Link...".to_string(),
                style: InputStyle::Short,
                required: false,
            },
        ],
    }
}

fn trading_for_modal() -> ModalView {
    ModalView {
        id: ModalKind::TradingFor.custom_id(),
        title: "List Item for Trade".to_string(),
        inputs: vec![
            ModalInput {
                id: "item_name".to_string(),
                label: "Name of the Item (What you have)".to_string(),
                placeholder: "Enter the item you want to trade...".to_string(),
                style: InputStyle::Short,
                required: true,
            },
            ModalInput {
                id: "want".to_string(),
                label: "What do you want for it?".to_string(),
                placeholder: "Enter what you want in exchange...".to_string(),
                style: InputStyle::Paragraph,
                required: true,
            },
            ModalInput {
                id: "image_url".to_string(),
                label: "Image URL (Optional)".to_string(),
                placeholder: "Upload image to Discord, right-click, Copy Link...".to_string(),
                style: InputStyle::Short,
                required: false,
            },
        ],
    }
}

fn offer_modal(index: usize, offer: &TradeListing) -> ModalView {
    ModalView {
        id: ModalKind::Offer(index).custom_id(),
        title: format!("Offer for {}", offer.item_name),
        inputs: vec![ModalInput {
            id: "your_offer".to_string(),
            label: "What do you want to offer?".to_string(),
            placeholder: format!("Owner wants: {}", offer.want),
            style: InputStyle::Paragraph,
            required: true,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalFileStore;
    use crate::view::Response;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
    use std::sync::Mutex;

    struct RecordingHost {
        created: Mutex<Vec<ChannelSpec>>,
        sent: Mutex<Vec<(ChannelId, MessageView)>>,
        deleted: Mutex<Vec<ChannelId>>,
        granted: Mutex<Vec<(ChannelId, UserId)>>,
        fail_create: AtomicBool,
        next_channel: AtomicU64,
    }

    impl RecordingHost {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                created: Mutex::new(Vec::new()),
                sent: Mutex::new(Vec::new()),
                deleted: Mutex::new(Vec::new()),
                granted: Mutex::new(Vec::new()),
                fail_create: AtomicBool::new(false),
                next_channel: AtomicU64::new(100),
            })
        }
    }

    #[async_trait]
    impl ChannelHost for RecordingHost {
        async fn create_private_channel(&self, spec: ChannelSpec) -> Result<ChannelId> {
            if self.fail_create.load(Ordering::SeqCst) {
                return Err(Error::Platform("missing Manage Channels".to_string()));
            }
            self.created.lock().unwrap().push(spec);
            Ok(ChannelId(self.next_channel.fetch_add(1, Ordering::SeqCst)))
        }

        async fn delete_channel(&self, channel: ChannelId) -> Result<()> {
            self.deleted.lock().unwrap().push(channel);
            Ok(())
        }

        async fn send_message(&self, channel: ChannelId, message: MessageView) -> Result<()> {
            self.sent.lock().unwrap().push((channel, message));
            Ok(())
        }

        async fn grant_access(&self, channel: ChannelId, user: &UserId) -> Result<()> {
            self.granted.lock().unwrap().push((channel, user.clone()));
            Ok(())
        }

        async fn resolve_category(&self, raw_id: &str) -> Result<Option<String>> {
            match raw_id {
                "555" => Ok(Some("Shop".to_string())),
                "556" => Ok(None),
                _ => Err(Error::Platform("unknown channel".to_string())),
            }
        }
    }

    fn test_cfg() -> Arc<Config> {
        Arc::new(Config {
            discord_bot_token: "test-token".to_string(),
            owner_id: UserId::new("owner"),
            jsonbin_api_key: None,
            listings_bin_id: None,
            config_bin_id: None,
            data_dir: PathBuf::from("/tmp"),
            reminder_interval: Duration::from_secs(60),
            close_grace: Duration::from_secs(5),
            decline_grace: Duration::from_secs(10),
        })
    }

    struct Fixture {
        shop: Shop,
        host: Arc<RecordingHost>,
        store: ShopStore,
        dir: PathBuf,
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.dir);
        }
    }

    fn fixture(tag: &str) -> Fixture {
        let dir = PathBuf::from(format!("/tmp/mkt-ticket-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let host = RecordingHost::new();
        let store = ShopStore::new(Arc::new(LocalFileStore::new(&dir)));
        let cfg = test_cfg();
        let reminders =
            ReminderRegistry::new(host.clone() as Arc<dyn ChannelHost>, cfg.reminder_interval);
        let shop = Shop::new(cfg, store.clone(), host.clone(), reminders);
        Fixture {
            shop,
            host,
            store,
            dir,
        }
    }

    fn ctx(id: &str, name: &str) -> EventCtx {
        EventCtx {
            actor: Actor::new(id, name, false),
            guild: GuildRef(1),
            channel: ChannelId(50),
        }
    }

    async fn seed_sale(store: &ShopStore, name: &str, seller: &str) {
        let mut catalog = store.catalog().await.unwrap();
        catalog
            .push_sale(SaleListing {
                name: name.to_string(),
                price: "100".to_string(),
                stock: "2".to_string(),
                seller_id: UserId::new(seller),
                seller_name: format!("user-{seller}"),
                image: None,
            })
            .unwrap();
        store.save_catalog(&catalog).await.unwrap();
    }

    async fn seed_trade(store: &ShopStore, name: &str, owner: &str) {
        let mut catalog = store.catalog().await.unwrap();
        catalog
            .push_trade(TradeListing {
                item_name: name.to_string(),
                want: "gems".to_string(),
                user_id: UserId::new(owner),
                user_name: format!("user-{owner}"),
                image: None,
            })
            .unwrap();
        store.save_catalog(&catalog).await.unwrap();
    }

    fn fields(pairs: &[(&str, &str)]) -> ModalFields {
        ModalFields(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn contact_seller_creates_active_ticket_with_timer() {
        let fx = fixture("contact");
        seed_sale(&fx.store, "Sword", "2").await;

        let buyer = ctx("1", "Buyer");
        let resp = fx
            .shop
            .handle_action(&buyer, Action::ContactSeller(0))
            .await
            .unwrap();

        let created = fx.host.created.lock().unwrap().pop().unwrap();
        assert!(created.name.starts_with("ticket-buyer-"));
        assert_eq!(
            created.allow,
            vec![UserId::new("1"), UserId::new("2")]
        );
        assert!(!created.include_admin_role);

        // Purchase tickets are ACTIVE immediately: timer already running.
        assert!(fx.shop.reminders().is_tracked(ChannelId(100)).await);

        match resp {
            Response::Ephemeral(text) => assert!(text.contains("<#100>")),
            other => panic!("unexpected response: {other:?}"),
        }

        // Opening message went to the new channel with a close button.
        let sent = fx.host.sent.lock().unwrap();
        let (channel, opening) = &sent[0];
        assert_eq!(*channel, ChannelId(100));
        assert_eq!(opening.rows[0][0].id, "close_ticket");

        fx.shop.reminders().cancel(ChannelId(100)).await;
    }

    #[tokio::test]
    async fn stale_contact_seller_index_is_not_found_without_side_effects() {
        let fx = fixture("stale");
        seed_sale(&fx.store, "Sword", "2").await;

        let err = fx
            .shop
            .handle_action(&ctx("1", "Buyer"), Action::ContactSeller(5))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(fx.host.created.lock().unwrap().is_empty());
        assert!(!fx.shop.reminders().is_tracked(ChannelId(100)).await);
    }

    #[tokio::test]
    async fn ticket_creation_failure_leaves_no_partial_state() {
        let fx = fixture("createfail");
        seed_sale(&fx.store, "Sword", "2").await;
        fx.host.fail_create.store(true, Ordering::SeqCst);

        let resp = fx
            .shop
            .handle_action(&ctx("1", "Buyer"), Action::ContactSeller(0))
            .await
            .unwrap();
        match resp {
            Response::Ephemeral(text) => assert!(text.contains("Failed to create ticket")),
            other => panic!("unexpected response: {other:?}"),
        }
        assert!(!fx.shop.reminders().is_tracked(ChannelId(100)).await);
        assert!(fx.host.sent.lock().unwrap().is_empty());
        // Catalog untouched.
        assert_eq!(fx.store.catalog().await.unwrap().sell.len(), 1);
    }

    #[tokio::test]
    async fn offer_opens_pending_channel_without_timer_or_offerer_access() {
        let fx = fixture("offer");
        seed_trade(&fx.store, "Shield", "9").await;

        let offerer = ctx("3", "Offerer");
        let resp = fx
            .shop
            .handle_modal(
                &offerer,
                ModalKind::Offer(0),
                &fields(&[("your_offer", "two swords")]),
            )
            .await
            .unwrap();

        let created = fx.host.created.lock().unwrap().pop().unwrap();
        assert!(created.name.starts_with("trade-offerer-"));
        // Only the listing owner is allowed in; the offerer waits outside.
        assert_eq!(created.allow, vec![UserId::new("9")]);
        assert!(created.include_admin_role);

        // Pending: no timer until the owner accepts.
        assert!(!fx.shop.reminders().is_tracked(ChannelId(100)).await);

        match resp {
            Response::Ephemeral(text) => assert!(text.contains("<#100>")),
            other => panic!("unexpected response: {other:?}"),
        }

        // Pending embed carries accept/decline tokens bound to the offerer.
        let sent = fx.host.sent.lock().unwrap();
        let ids: Vec<_> = sent[0].1.rows[0].iter().map(|b| b.id.clone()).collect();
        assert_eq!(ids, vec!["accept_trade_3", "decline_trade_3"]);
    }

    #[tokio::test]
    async fn accept_grants_access_and_starts_timer() {
        let fx = fixture("accept");
        let owner = EventCtx {
            actor: Actor::new("9", "Owner", false),
            guild: GuildRef(1),
            channel: ChannelId(100),
        };

        let resp = fx
            .shop
            .handle_action(&owner, Action::AcceptTrade(UserId::new("3")))
            .await
            .unwrap();

        assert_eq!(
            fx.host.granted.lock().unwrap()[0],
            (ChannelId(100), UserId::new("3"))
        );
        assert!(fx.shop.reminders().is_tracked(ChannelId(100)).await);
        match resp {
            Response::Rewrite(text) => assert!(text.contains("Trade accepted")),
            other => panic!("unexpected response: {other:?}"),
        }

        fx.shop.reminders().cancel(ChannelId(100)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn decline_schedules_deletion_without_any_grant() {
        let fx = fixture("decline");
        let owner = EventCtx {
            actor: Actor::new("9", "Owner", false),
            guild: GuildRef(1),
            channel: ChannelId(100),
        };

        let resp = fx
            .shop
            .handle_action(&owner, Action::DeclineTrade(UserId::new("3")))
            .await
            .unwrap();
        match resp {
            Response::Rewrite(text) => assert!(text.contains("close in 10 seconds")),
            other => panic!("unexpected response: {other:?}"),
        }
        assert!(fx.host.granted.lock().unwrap().is_empty());
        assert!(!fx.shop.reminders().is_tracked(ChannelId(100)).await);

        // Deletion only after the grace delay.
        tokio::time::sleep(Duration::from_secs(9)).await;
        assert!(fx.host.deleted.lock().unwrap().is_empty());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(*fx.host.deleted.lock().unwrap(), vec![ChannelId(100)]);
    }

    #[tokio::test(start_paused = true)]
    async fn close_cancels_timer_then_deletes_after_grace() {
        let fx = fixture("close");
        let registry = fx.shop.reminders().clone();
        registry
            .start(ChannelId(100), UserId::new("1"), UserId::new("2"))
            .await;

        let participant = EventCtx {
            actor: Actor::new("1", "Buyer", false),
            guild: GuildRef(1),
            channel: ChannelId(100),
        };
        let resp = fx
            .shop
            .handle_action(&participant, Action::CloseTicket)
            .await
            .unwrap();
        match resp {
            Response::Say(text) => assert!(text.contains("Closing ticket in 5 seconds")),
            other => panic!("unexpected response: {other:?}"),
        }
        assert!(!registry.is_tracked(ChannelId(100)).await);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(*fx.host.deleted.lock().unwrap(), vec![ChannelId(100)]);
    }

    #[tokio::test]
    async fn invalid_image_url_rejects_submission_before_mutation() {
        let fx = fixture("badimage");

        let err = fx
            .shop
            .handle_modal(
                &ctx("1", "Seller"),
                ModalKind::Sell,
                &fields(&[
                    ("item_name", "Sword"),
                    ("price", "100"),
                    ("stock", "1"),
                    ("image_url", "not a url"),
                ]),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert!(fx.store.catalog().await.unwrap().sell.is_empty());
    }

    #[tokio::test]
    async fn sale_submission_persists_and_announces() {
        let fx = fixture("announce");
        let mut settings = BotSettings::default();
        settings.announcement_channel = Some(ChannelId(77));
        fx.store.save_settings(&settings).await.unwrap();

        let resp = fx
            .shop
            .handle_modal(
                &ctx("1", "Seller"),
                ModalKind::Sell,
                &fields(&[("item_name", "Sword"), ("price", "100"), ("stock", "1")]),
            )
            .await
            .unwrap();
        assert!(matches!(resp, Response::EphemeralView(_)));

        let catalog = fx.store.catalog().await.unwrap();
        assert_eq!(catalog.sell.len(), 1);
        assert_eq!(catalog.sell[0].seller_id, UserId::new("1"));

        // Announcement carries a contact button for the new listing's index.
        let sent = fx.host.sent.lock().unwrap();
        let (channel, announce) = &sent[0];
        assert_eq!(*channel, ChannelId(77));
        assert_eq!(announce.rows[0][0].id, "contact_seller_0");
    }

    #[tokio::test]
    async fn copied_removal_token_is_forbidden_for_other_users() {
        let fx = fixture("forbidden");
        seed_sale(&fx.store, "Sword", "1").await;

        let err = fx
            .shop
            .handle_action(
                &ctx("2", "Intruder"),
                Action::RemoveListing {
                    owner: UserId::new("1"),
                    position: 0,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
        assert_eq!(fx.store.catalog().await.unwrap().sell.len(), 1);
    }

    #[tokio::test]
    async fn own_removal_panel_and_resolution_use_true_indices() {
        let fx = fixture("ownremove");
        seed_sale(&fx.store, "A", "1").await;
        seed_sale(&fx.store, "B", "2").await;

        let user1 = ctx("1", "One");
        let panel = fx
            .shop
            .handle_action(&user1, Action::RemoveListingMenu)
            .await
            .unwrap();
        match panel {
            Response::EphemeralView(view) => {
                // Only the caller's listing shows up.
                let embed = view.embed.unwrap();
                assert_eq!(embed.fields.len(), 1);
                assert!(embed.fields[0].name.contains("A"));
                assert_eq!(view.rows[0][0].id, "remove_listing_1_0");
            }
            other => panic!("unexpected response: {other:?}"),
        }

        let resp = fx
            .shop
            .handle_action(
                &user1,
                Action::RemoveListing {
                    owner: UserId::new("1"),
                    position: 0,
                },
            )
            .await
            .unwrap();
        match resp {
            Response::EphemeralClear(text) => assert!(text.contains("**A**")),
            other => panic!("unexpected response: {other:?}"),
        }

        let catalog = fx.store.catalog().await.unwrap();
        assert_eq!(catalog.sell.len(), 1);
        assert_eq!(catalog.sell[0].name, "B");
    }

    #[tokio::test]
    async fn admin_removal_requires_privilege() {
        let fx = fixture("adminremove");
        seed_sale(&fx.store, "A", "1").await;

        let err = fx
            .shop
            .handle_action(&ctx("2", "Rando"), Action::AdminRemoveMenu)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        // The owner passes the gate and sees every listing.
        let owner = ctx("owner", "Owner");
        let panel = fx
            .shop
            .handle_action(&owner, Action::AdminRemoveMenu)
            .await
            .unwrap();
        match panel {
            Response::EphemeralView(view) => {
                assert_eq!(view.rows[0][0].id, "admin_remove_item_0")
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn clearshop_is_gated_and_wipes_listings() {
        let fx = fixture("clear");
        seed_sale(&fx.store, "A", "1").await;

        let denied = fx
            .shop
            .handle_command(&ctx("2", "Rando"), ShopCommand::ClearShop)
            .await
            .unwrap();
        assert_eq!(denied, Response::Say(NEED_ADMIN.to_string()));
        assert_eq!(fx.store.catalog().await.unwrap().sell.len(), 1);

        let cleared = fx
            .shop
            .handle_command(&ctx("owner", "Owner"), ShopCommand::ClearShop)
            .await
            .unwrap();
        assert!(matches!(cleared, Response::Say(_)));
        assert!(fx.store.catalog().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn setshop_validates_the_category() {
        let fx = fixture("setshop");
        let owner = ctx("owner", "Owner");

        let ok = fx
            .shop
            .handle_command(&owner, ShopCommand::SetShop(Some("555".to_string())))
            .await
            .unwrap();
        match ok {
            Response::Say(text) => assert!(text.contains("**Shop**")),
            other => panic!("unexpected response: {other:?}"),
        }
        assert_eq!(
            fx.store.settings().await.unwrap().shop_category,
            Some(CategoryId(555))
        );

        let not_category = fx
            .shop
            .handle_command(&owner, ShopCommand::SetShop(Some("556".to_string())))
            .await
            .unwrap();
        match not_category {
            Response::Say(text) => assert!(text.contains("not a category")),
            other => panic!("unexpected response: {other:?}"),
        }

        let unknown = fx
            .shop
            .handle_command(&owner, ShopCommand::SetShop(Some("999".to_string())))
            .await
            .unwrap();
        match unknown {
            Response::Say(text) => assert!(text.contains("Invalid category ID")),
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn admin_list_commands_are_owner_only() {
        let fx = fixture("admins");
        let owner = ctx("owner", "Owner");

        let denied = fx
            .shop
            .handle_command(
                &ctx("2", "Rando"),
                ShopCommand::AddAdmin(Some(UserId::new("5"))),
            )
            .await
            .unwrap();
        assert_eq!(denied, Response::Say(OWNER_ONLY.to_string()));

        let added = fx
            .shop
            .handle_command(&owner, ShopCommand::AddAdmin(Some(UserId::new("5"))))
            .await
            .unwrap();
        assert!(matches!(added, Response::Say(_)));
        assert!(fx
            .store
            .settings()
            .await
            .unwrap()
            .is_admin(&UserId::new("5")));

        let duplicate = fx
            .shop
            .handle_command(&owner, ShopCommand::AddAdmin(Some(UserId::new("5"))))
            .await
            .unwrap();
        match duplicate {
            Response::Say(text) => assert!(text.contains("already a bot admin")),
            other => panic!("unexpected response: {other:?}"),
        }

        // The new admin passes the privilege gate for privileged commands.
        let shop_menu = fx
            .shop
            .handle_command(&ctx("5", "NewAdmin"), ShopCommand::Shop)
            .await
            .unwrap();
        assert!(matches!(shop_menu, Response::Post(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn messages_in_negotiation_channels_reset_the_timer() {
        let fx = fixture("notemsg");
        let registry = fx.shop.reminders().clone();
        registry
            .start(ChannelId(100), UserId::new("1"), UserId::new("2"))
            .await;

        tokio::time::sleep(Duration::from_secs(50)).await;
        fx.shop
            .note_message(ChannelId(100), "ticket-buyer-1700000000")
            .await;

        // The original deadline passes quietly; the reset one fires.
        tokio::time::sleep(Duration::from_secs(55)).await;
        assert!(fx.host.sent.lock().unwrap().is_empty());
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fx.host.sent.lock().unwrap().len(), 1);

        // Unrelated channels never reset anything.
        fx.shop.note_message(ChannelId(101), "general").await;
        assert!(!registry.is_tracked(ChannelId(101)).await);

        registry.cancel(ChannelId(100)).await;
    }
}
