//! Effective-privilege resolution.

use crate::{domain::Actor, domain::UserId, settings::BotSettings};

/// True when the actor may use privileged commands: platform administrator,
/// listed in the settings admins, or the fixed owner identity.
///
/// `settings` is `None` when the settings document failed to load; that
/// fails closed to the platform-admin-or-owner check, never to "allow all".
pub fn is_privileged(actor: &Actor, settings: Option<&BotSettings>, owner: &UserId) -> bool {
    if actor.is_platform_admin || actor.id == *owner {
        return true;
    }
    settings.map(|s| s.is_admin(&actor.id)).unwrap_or(false)
}

/// Owner-only commands (admin-list management) bypass the settings admins
/// entirely.
pub fn is_owner(actor: &Actor, owner: &UserId) -> bool {
    actor.id == *owner
}
