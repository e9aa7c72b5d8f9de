//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, SpaceConfig, OwnerConfig)
//! - [`topology`]: Declarative target topology (roles, categories, channels,
//!   protected / bot-allowed classification)
//! - [`moderation`]: Moderation settings (verification level, content filter,
//!   slow-mode seconds, auto-moderation toggles)
//! - [`webhooks`]: Repository-to-channel integration mappings
//! - [`validation`]: Load-time invariant checks (rejected before any mutation)

mod moderation;
mod topology;
mod types;
mod validation;
mod webhooks;

pub use moderation::{AutoModConfig, ContentFilter, ModerationConfig, VerificationLevel};
pub use topology::{
    CategoryDef, ChannelDef, RoleDef, TopologySpec, MODERATION_CATEGORY, QUARANTINE_CHANNEL,
    QUARANTINE_CHANNEL_TOPIC, category_display_name,
};
pub use types::{Config, ConfigError, OwnerConfig, SpaceConfig};
pub use validation::{ValidationError, validate};
pub use webhooks::{RepositoryMapping, WebhookConfig};

pub(crate) fn default_true() -> bool {
    true
}
