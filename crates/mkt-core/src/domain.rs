use serde::{Deserialize, Serialize};

/// Opaque user identity (Discord snowflake as a string).
///
/// Listings reference their owner by this id only; it is never validated
/// against platform membership.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// `<@id>` mention string.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Channel id (numeric snowflake).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub u64);

impl ChannelId {
    /// `<#id>` channel link string.
    pub fn link(&self) -> String {
        format!("<#{}>", self.0)
    }
}

/// Category id for ticket channel placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

/// Guild (server) the bot is acting in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GuildRef(pub u64);

/// The user behind an inbound event, with the platform-native privilege flag
/// already resolved by the adapter.
#[derive(Clone, Debug)]
pub struct Actor {
    pub id: UserId,
    pub name: String,
    pub is_platform_admin: bool,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, is_platform_admin: bool) -> Self {
        Self {
            id: UserId::new(id),
            name: name.into(),
            is_platform_admin,
        }
    }
}
