//! Configuration validation.
//!
//! Topology invariants are checked at load time, before any reconciliation
//! operation is attempted. A violated invariant here would otherwise surface
//! mid-pass as a partial, inconsistent application.

use std::collections::HashSet;
use thiserror::Error;

use super::Config;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("space.name is required")]
    MissingSpaceName,
    #[error("channel name '{0}' is declared more than once in the topology")]
    DuplicateChannelName(String),
    #[error("role key '{0}' is declared more than once in the topology")]
    DuplicateRoleKey(String),
    #[error("channel '{0}' is both protected and bot-allowed")]
    ProtectedBotAllowedOverlap(String),
    #[error("webhook repository '{0}' has an empty events list")]
    EmptyWebhookEvents(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.space.name.is_empty() {
        errors.push(ValidationError::MissingSpaceName);
    }

    // Channel names must be unique across the whole topology. The reconciler's
    // channel lookup is global, so a duplicate in a second category would be
    // silently skipped as already-existing.
    let mut seen_channels = HashSet::new();
    for name in config.topology.channel_names() {
        if !seen_channels.insert(name) {
            errors.push(ValidationError::DuplicateChannelName(name.to_string()));
        }
    }

    let mut seen_keys = HashSet::new();
    for role in &config.topology.roles {
        if !seen_keys.insert(role.key.as_str()) {
            errors.push(ValidationError::DuplicateRoleKey(role.key.clone()));
        }
    }

    // A bot-allowed channel gets an explicit automation allow that would
    // silently defeat a protected channel's deny; the sets must be disjoint.
    for name in &config.topology.protected_channels {
        if config.topology.bot_allowed_channels.contains(name) {
            errors.push(ValidationError::ProtectedBotAllowedOverlap(name.clone()));
        }
    }

    if config.webhooks.enabled {
        for repo in &config.webhooks.repositories {
            if repo.events.is_empty() {
                errors.push(ValidationError::EmptyWebhookEvents(repo.slug()));
            }
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_valid_config() -> String {
        r#"
[space]
name = "TestSpace"
"#
        .to_string()
    }

    #[test]
    fn default_config_passes() {
        let config: Config = toml::from_str(&minimal_valid_config()).unwrap();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn empty_space_name_fails() {
        let config: Config = toml::from_str(
            r#"
[space]
name = ""
"#,
        )
        .unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ValidationError::MissingSpaceName))
        );
    }

    #[test]
    fn overlapping_protected_and_bot_allowed_fails() {
        let config: Config = toml::from_str(
            r#"
[space]
name = "TestSpace"

[topology]
protected_channels = ["dev-updates"]
bot_allowed_channels = ["dev-updates"]
"#,
        )
        .unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::ProtectedBotAllowedOverlap(name) if name == "dev-updates"
        )));
    }

    #[test]
    fn duplicate_channel_name_across_categories_fails() {
        let config: Config = toml::from_str(
            r#"
[space]
name = "TestSpace"

[[topology.categories]]
key = "info"
channels = [{ name = "general", description = "a" }]

[[topology.categories]]
key = "lounge"
channels = [{ name = "general", description = "b" }]
"#,
        )
        .unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::DuplicateChannelName(name) if name == "general"
        )));
    }

    #[test]
    fn webhook_mapping_without_events_fails() {
        let config: Config = toml::from_str(
            r#"
[space]
name = "TestSpace"

[[webhooks.repositories]]
name = "GlowStatus"
owner = "Severswoed"
channel = "dev-updates"
"#,
        )
        .unwrap();
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::EmptyWebhookEvents(slug) if slug == "Severswoed/GlowStatus"
        )));
    }
}
