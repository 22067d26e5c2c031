use async_trait::async_trait;

use crate::{
    domain::{CategoryId, ChannelId, GuildRef, UserId},
    view::MessageView,
    Result,
};

/// Request to create a private negotiation channel.
#[derive(Clone, Debug)]
pub struct ChannelSpec {
    pub guild: GuildRef,
    pub name: String,
    pub topic: String,
    pub category: Option<CategoryId>,
    /// Users granted view/send from the start. Everyone else is denied view.
    pub allow: Vec<UserId>,
    /// Also grant the guild's administrator role, when one exists (trade
    /// negotiations stay visible to staff before the offerer is let in).
    pub include_admin_role: bool,
}

/// Port for the platform's channel/message surface.
///
/// Discord is the first implementation; everything the negotiation state
/// machine needs from the host platform goes through here so the core stays
/// SDK-free and testable.
#[async_trait]
pub trait ChannelHost: Send + Sync {
    async fn create_private_channel(&self, spec: ChannelSpec) -> Result<ChannelId>;
    async fn delete_channel(&self, channel: ChannelId) -> Result<()>;
    async fn send_message(&self, channel: ChannelId, message: MessageView) -> Result<()>;
    /// Grant view/send on an existing channel (trade accept).
    async fn grant_access(&self, channel: ChannelId, user: &UserId) -> Result<()>;
    /// Resolve a raw id to a category name; `Ok(None)` when the id exists
    /// but is not a category.
    async fn resolve_category(&self, raw_id: &str) -> Result<Option<String>>;
}
