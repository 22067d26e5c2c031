use serde::{Deserialize, Serialize};

use crate::domain::{CategoryId, ChannelId, UserId};

/// Persisted bot configuration, mutated only by privileged actors.
///
/// Lifecycle is load-mutate-save per command with no caching across commands.
/// Two concurrent admin edits can race load/save and the second save wins;
/// accepted given the low expected concurrency.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BotSettings {
    #[serde(default)]
    pub announcement_channel: Option<ChannelId>,
    #[serde(default)]
    pub shop_category: Option<CategoryId>,
    #[serde(default)]
    pub admins: Vec<UserId>,
}

impl BotSettings {
    pub fn is_admin(&self, user: &UserId) -> bool {
        self.admins.contains(user)
    }

    /// Returns false when the user was already an admin.
    pub fn add_admin(&mut self, user: UserId) -> bool {
        if self.is_admin(&user) {
            return false;
        }
        self.admins.push(user);
        true
    }

    /// Returns false when the user was not an admin.
    pub fn remove_admin(&mut self, user: &UserId) -> bool {
        let before = self.admins.len();
        self.admins.retain(|id| id != user);
        self.admins.len() != before
    }
}
