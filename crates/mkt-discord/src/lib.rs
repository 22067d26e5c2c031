//! Discord adapter (serenity).
//!
//! This crate implements the `mkt-core` ChannelHost port over the Discord
//! REST API and wires gateway events into the core engine.

use std::sync::Arc;

use async_trait::async_trait;

use serenity::all::{
    Channel, ChannelType, CreateChannel, GuildId, PermissionOverwrite, PermissionOverwriteType,
    Permissions, RoleId,
};
use serenity::http::Http;

pub mod handler;
pub mod render;

use mkt_core::{
    domain::{ChannelId, UserId},
    errors::Error,
    ports::{ChannelHost, ChannelSpec},
    view::MessageView,
    Result,
};

#[derive(Clone)]
pub struct DiscordHost {
    http: Arc<Http>,
}

impl DiscordHost {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    pub fn http(&self) -> Arc<Http> {
        self.http.clone()
    }

    fn dc_channel(channel: ChannelId) -> serenity::all::ChannelId {
        serenity::all::ChannelId::new(channel.0)
    }

    fn dc_user(user: &UserId) -> Result<serenity::all::UserId> {
        user.0
            .parse::<u64>()
            .map(serenity::all::UserId::new)
            .map_err(|_| Error::Platform(format!("invalid user id {:?}", user.0)))
    }

    fn map_err(e: serenity::Error) -> Error {
        Error::Platform(format!("discord error: {e}"))
    }

    /// View + send + history for one participant.
    fn participant_overwrite(user: serenity::all::UserId) -> PermissionOverwrite {
        PermissionOverwrite {
            allow: Permissions::VIEW_CHANNEL
                | Permissions::SEND_MESSAGES
                | Permissions::READ_MESSAGE_HISTORY,
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Member(user),
        }
    }

    /// First role carrying the Administrator permission, if the guild has
    /// one. Lookup failures degrade to "no staff role" rather than failing
    /// channel creation.
    async fn admin_role(&self, guild: GuildId) -> Option<RoleId> {
        match self.http.get_guild(guild).await {
            Ok(g) => g
                .roles
                .iter()
                .find(|(_, role)| role.permissions.administrator())
                .map(|(id, _)| *id),
            Err(e) => {
                eprintln!("[TICKET] Failed to look up admin role: {e}");
                None
            }
        }
    }
}

#[async_trait]
impl ChannelHost for DiscordHost {
    async fn create_private_channel(&self, spec: ChannelSpec) -> Result<ChannelId> {
        let guild = GuildId::new(spec.guild.0);

        // @everyone (role id == guild id) is denied view; participants get
        // explicit allows on top.
        let mut overwrites = vec![PermissionOverwrite {
            allow: Permissions::empty(),
            deny: Permissions::VIEW_CHANNEL,
            kind: PermissionOverwriteType::Role(RoleId::new(spec.guild.0)),
        }];
        for user in &spec.allow {
            overwrites.push(Self::participant_overwrite(Self::dc_user(user)?));
        }
        if spec.include_admin_role {
            if let Some(role) = self.admin_role(guild).await {
                overwrites.push(PermissionOverwrite {
                    allow: Permissions::VIEW_CHANNEL
                        | Permissions::SEND_MESSAGES
                        | Permissions::READ_MESSAGE_HISTORY,
                    deny: Permissions::empty(),
                    kind: PermissionOverwriteType::Role(role),
                });
            }
        }

        let mut builder = CreateChannel::new(spec.name)
            .kind(ChannelType::Text)
            .topic(spec.topic)
            .permissions(overwrites);
        if let Some(category) = spec.category {
            builder = builder.category(serenity::all::ChannelId::new(category.0));
        }

        let channel = guild
            .create_channel(&self.http, builder)
            .await
            .map_err(Self::map_err)?;
        Ok(ChannelId(channel.id.get()))
    }

    async fn delete_channel(&self, channel: ChannelId) -> Result<()> {
        Self::dc_channel(channel)
            .delete(&self.http)
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn send_message(&self, channel: ChannelId, message: MessageView) -> Result<()> {
        Self::dc_channel(channel)
            .send_message(&self.http, render::message(&message))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn grant_access(&self, channel: ChannelId, user: &UserId) -> Result<()> {
        Self::dc_channel(channel)
            .create_permission(&self.http, Self::participant_overwrite(Self::dc_user(user)?))
            .await
            .map_err(Self::map_err)
    }

    async fn resolve_category(&self, raw_id: &str) -> Result<Option<String>> {
        let id: u64 = raw_id
            .parse()
            .map_err(|_| Error::Platform(format!("invalid channel id {raw_id:?}")))?;
        let channel = self
            .http
            .get_channel(serenity::all::ChannelId::new(id))
            .await
            .map_err(Self::map_err)?;
        match channel {
            Channel::Guild(gc) if gc.kind == ChannelType::Category => Ok(Some(gc.name)),
            _ => Ok(None),
        }
    }
}
