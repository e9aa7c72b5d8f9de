//! Moderator command handlers.
//!
//! Each command names the capability a caller must hold; the authorization
//! layer in front of the event queue checks it, not this module. Handlers
//! return an informational [`Reply`] in every case — a target already in the
//! desired state gets an explicit response, never silence.

mod moderation;
mod status;
mod webhooks;

pub use status::SecurityStatus;

use crate::config::Config;
use crate::directory::Directory;
use crate::gateway::{Gateway, MemberId};
use crate::security::TrustEngine;
use crate::store::WebhookStore;

/// Capability a caller must hold for a command, checked by the collaborator
/// authorization layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageRoles,
    ManageChannels,
    ManageGuild,
    Administrator,
}

/// A moderator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModCommand {
    Quarantine { member: MemberId, reason: String },
    Unquarantine { member: MemberId },
    Verify { member: MemberId },
    Lockdown { channel: String },
    Unlock { channel: String },
    SecurityStatus,
    ListWebhooks,
    ReprovisionWebhooks,
    AssignAdmin { member: MemberId },
}

impl ModCommand {
    /// Command name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Quarantine { .. } => "quarantine",
            Self::Unquarantine { .. } => "unquarantine",
            Self::Verify { .. } => "verify",
            Self::Lockdown { .. } => "lockdown",
            Self::Unlock { .. } => "unlock",
            Self::SecurityStatus => "security_status",
            Self::ListWebhooks => "webhooks",
            Self::ReprovisionWebhooks => "remake_webhooks",
            Self::AssignAdmin { .. } => "assign_admin",
        }
    }

    /// Capability the caller must hold.
    pub fn required_capability(&self) -> Capability {
        match self {
            Self::Quarantine { .. } | Self::Unquarantine { .. } | Self::Verify { .. } => {
                Capability::ManageRoles
            }
            Self::Lockdown { .. } | Self::Unlock { .. } => Capability::ManageChannels,
            Self::SecurityStatus | Self::ListWebhooks => Capability::ManageGuild,
            Self::ReprovisionWebhooks | Self::AssignAdmin { .. } => Capability::Administrator,
        }
    }
}

/// Informational response to the command issuer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply(pub String);

impl Reply {
    pub fn text(&self) -> &str {
        &self.0
    }
}

impl From<String> for Reply {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Reply {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Handler context, borrowed for the duration of one command.
pub struct Context<'a> {
    pub config: &'a Config,
    pub directory: &'a mut Directory,
    pub trust: &'a TrustEngine,
    pub gateway: &'a dyn Gateway,
    pub store: &'a WebhookStore,
}

/// Dispatch one command to its handler.
pub async fn dispatch(ctx: &mut Context<'_>, command: ModCommand) -> Reply {
    tracing::info!(command = command.name(), "handling moderator command");
    match command {
        ModCommand::Quarantine { member, reason } => {
            moderation::quarantine(ctx, member, &reason).await
        }
        ModCommand::Unquarantine { member } => moderation::unquarantine(ctx, member).await,
        ModCommand::Verify { member } => moderation::verify(ctx, member).await,
        ModCommand::Lockdown { channel } => moderation::lockdown(ctx, &channel).await,
        ModCommand::Unlock { channel } => moderation::unlock(ctx, &channel).await,
        ModCommand::SecurityStatus => status::security_status(ctx),
        ModCommand::ListWebhooks => webhooks::list_webhooks(ctx),
        ModCommand::ReprovisionWebhooks => webhooks::reprovision_webhooks(ctx).await,
        ModCommand::AssignAdmin { member } => moderation::assign_admin(ctx, member).await,
    }
}
