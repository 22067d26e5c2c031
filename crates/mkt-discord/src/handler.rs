//! Gateway event wiring.
//!
//! Inbound messages and interactions are parsed into core commands/actions,
//! handed to the engine, and the returned [`Response`] descriptor is rendered
//! back through serenity. All privilege resolution that needs the platform
//! (Administrator permission) happens here, before the core sees the actor.

use std::sync::Arc;

use serenity::all::{
    ActionRowComponent, ComponentInteraction, Context, CreateInteractionResponse,
    CreateInteractionResponseMessage, EventHandler, GatewayIntents, GuildId, Interaction, Message,
    ModalInteraction, Ready,
};
use serenity::async_trait;
use serenity::http::Http;
use serenity::Client;

use mkt_core::{
    command,
    domain::{Actor, ChannelId, GuildRef},
    interaction::{Action, ModalKind},
    ticket::{EventCtx, ModalFields, Shop},
    view::Response,
};

const GENERIC_FAILURE: &str = "❌ Something went wrong. Please try again.";

pub struct Handler {
    shop: Arc<Shop>,
}

impl Handler {
    pub fn new(shop: Arc<Shop>) -> Self {
        Self { shop }
    }

    async fn on_message(&self, ctx: &Context, msg: &Message) {
        let Some(guild_id) = msg.guild_id else {
            return;
        };

        // Activity in a negotiation channel resets its idle timer.
        if let Ok(name) = msg.channel_id.name(ctx).await {
            self.shop
                .note_message(ChannelId(msg.channel_id.get()), &name)
                .await;
        }

        let Some(cmd) = command::parse(&msg.content) else {
            return;
        };

        let is_admin = platform_admin(&ctx.http, guild_id, msg.author.id).await;
        let ev = EventCtx {
            actor: Actor::new(msg.author.id.to_string(), msg.author.name.clone(), is_admin),
            guild: GuildRef(guild_id.get()),
            channel: ChannelId(msg.channel_id.get()),
        };

        let reply = match self.shop.handle_command(&ev, cmd).await {
            Ok(Response::Say(text)) => {
                let _ = msg.channel_id.say(&ctx.http, text).await;
                return;
            }
            Ok(Response::Post(view)) => {
                let _ = msg
                    .channel_id
                    .send_message(&ctx.http, crate::render::message(&view))
                    .await;
                return;
            }
            Ok(other) => {
                eprintln!("[BOT] Unexpected command response: {other:?}");
                return;
            }
            Err(e) => match e.user_message() {
                Some(text) => format!("❌ {text}"),
                None => {
                    eprintln!("[BOT] Command failed: {e}");
                    GENERIC_FAILURE.to_string()
                }
            },
        };
        let _ = msg.channel_id.say(&ctx.http, reply).await;
    }

    async fn on_component(&self, ctx: &Context, component: &ComponentInteraction) {
        let Some(action) = Action::parse(&component.data.custom_id) else {
            return;
        };
        let Some(guild_id) = component.guild_id else {
            return;
        };

        // Interaction payloads carry the member's resolved permissions.
        let is_admin = component
            .member
            .as_ref()
            .and_then(|m| m.permissions)
            .is_some_and(|p| p.administrator());
        let ev = EventCtx {
            actor: Actor::new(
                component.user.id.to_string(),
                component.user.name.clone(),
                is_admin,
            ),
            guild: GuildRef(guild_id.get()),
            channel: ChannelId(component.channel_id.get()),
        };

        let response = to_interaction_response(self.shop.handle_action(&ev, action).await);
        if let Err(e) = component.create_response(&ctx.http, response).await {
            eprintln!("[BOT] Failed to respond to component interaction: {e}");
        }
    }

    async fn on_modal(&self, ctx: &Context, modal: &ModalInteraction) {
        let Some(kind) = ModalKind::parse(&modal.data.custom_id) else {
            return;
        };
        let Some(guild_id) = modal.guild_id else {
            return;
        };

        let mut fields = ModalFields::default();
        for row in &modal.data.components {
            for component in &row.components {
                if let ActionRowComponent::InputText(input) = component {
                    fields.0.insert(
                        input.custom_id.clone(),
                        input.value.clone().unwrap_or_default(),
                    );
                }
            }
        }

        let is_admin = modal
            .member
            .as_ref()
            .and_then(|m| m.permissions)
            .is_some_and(|p| p.administrator());
        let ev = EventCtx {
            actor: Actor::new(modal.user.id.to_string(), modal.user.name.clone(), is_admin),
            guild: GuildRef(guild_id.get()),
            channel: ChannelId(modal.channel_id.get()),
        };

        let response = to_interaction_response(self.shop.handle_modal(&ev, kind, &fields).await);
        if let Err(e) = modal.create_response(&ctx.http, response).await {
            eprintln!("[BOT] Failed to respond to modal submission: {e}");
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        println!("[BOT] Logged in as {}", ready.user.name);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        self.on_message(&ctx, &msg).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Component(component) => self.on_component(&ctx, &component).await,
            Interaction::Modal(modal) => self.on_modal(&ctx, &modal).await,
            _ => {}
        }
    }
}

/// Map an engine result onto the single response an interaction gets.
fn to_interaction_response(
    result: mkt_core::Result<Response>,
) -> CreateInteractionResponse {
    let response = match result {
        Ok(r) => r,
        Err(e) => {
            let text = match e.user_message() {
                Some(text) => format!("❌ {text}"),
                None => {
                    eprintln!("[BOT] Interaction failed: {e}");
                    GENERIC_FAILURE.to_string()
                }
            };
            return CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(text)
                    .ephemeral(true),
            );
        }
    };

    match response {
        Response::Ephemeral(text) => CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(text)
                .ephemeral(true),
        ),
        Response::EphemeralClear(text) => CreateInteractionResponse::UpdateMessage(
            CreateInteractionResponseMessage::new()
                .content(text)
                .embeds(Vec::new())
                .components(Vec::new()),
        ),
        Response::EphemeralView(view) => CreateInteractionResponse::Message(
            crate::render::response_message(&view).ephemeral(true),
        ),
        Response::Say(text) => CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new().content(text),
        ),
        Response::Post(view) => {
            CreateInteractionResponse::Message(crate::render::response_message(&view))
        }
        Response::Page { view, update } => {
            let message = crate::render::response_message(&view);
            if update {
                CreateInteractionResponse::UpdateMessage(message)
            } else {
                CreateInteractionResponse::Message(message.ephemeral(true))
            }
        }
        Response::Modal(modal) => CreateInteractionResponse::Modal(crate::render::modal(&modal)),
        Response::Rewrite(text) => CreateInteractionResponse::UpdateMessage(
            CreateInteractionResponseMessage::new()
                .content(text)
                .embeds(Vec::new())
                .components(Vec::new()),
        ),
    }
}

/// Guild-owner or Administrator-role check for text commands. Gateway
/// messages carry no resolved permissions, so this goes through REST; any
/// failure means "not an admin" (the gate fails closed).
async fn platform_admin(
    http: &Http,
    guild_id: GuildId,
    user_id: serenity::all::UserId,
) -> bool {
    let guild = match http.get_guild(guild_id).await {
        Ok(g) => g,
        Err(e) => {
            eprintln!("[BOT] Failed to fetch guild for privilege check: {e}");
            return false;
        }
    };
    if guild.owner_id == user_id {
        return true;
    }
    let member = match http.get_member(guild_id, user_id).await {
        Ok(m) => m,
        Err(e) => {
            eprintln!("[BOT] Failed to fetch member for privilege check: {e}");
            return false;
        }
    };
    member.roles.iter().any(|role_id| {
        guild
            .roles
            .get(role_id)
            .is_some_and(|role| role.permissions.administrator())
    })
}

/// Connect to the gateway and dispatch events until the connection dies.
pub async fn run_gateway(token: &str, shop: Arc<Shop>) -> anyhow::Result<()> {
    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(token, intents)
        .event_handler(Handler::new(shop))
        .await?;
    client.start().await?;
    Ok(())
}
