//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::default_true;
use super::moderation::ModerationConfig;
use super::topology::TopologySpec;
use super::webhooks::WebhookConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Daemon configuration.
///
/// Constructed once at startup and passed by reference into each component;
/// never mutated afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Community space identity.
    pub space: SpaceConfig,
    /// Declarative target topology.
    #[serde(default)]
    pub topology: TopologySpec,
    /// Moderation settings.
    #[serde(default)]
    pub moderation: ModerationConfig,
    /// Repository integration webhooks.
    #[serde(default)]
    pub webhooks: WebhookConfig,
    /// Owner identity (looked up by name, never back-patched).
    #[serde(default)]
    pub owner: Option<OwnerConfig>,
    /// Operator names allowed to trigger provisioning actions.
    #[serde(default)]
    pub authorized_operators: Vec<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Whether `name` is on the operator allow-list (case-insensitive).
    pub fn operator_authorized(&self, name: &str) -> bool {
        self.authorized_operators
            .iter()
            .any(|op| op.eq_ignore_ascii_case(name))
    }
}

/// Community space identity.
#[derive(Debug, Clone, Deserialize)]
pub struct SpaceConfig {
    /// Display name of the community space (e.g., "GlowStatus").
    pub name: String,
    /// Path to the webhook snapshot file.
    #[serde(default = "default_snapshot_path")]
    pub webhook_snapshot: String,
}

fn default_snapshot_path() -> String {
    "active_webhooks.json".to_string()
}

/// Owner identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OwnerConfig {
    /// Owner display name, matched case-insensitively against members.
    pub username: String,
    /// Grant the admin role to the owner during a provisioning pass.
    #[serde(default = "default_true")]
    pub auto_assign_admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_parses() {
        let config: Config = toml::from_str(
            r#"
[space]
name = "TestSpace"
"#,
        )
        .unwrap();
        assert_eq!(config.space.name, "TestSpace");
        assert_eq!(config.space.webhook_snapshot, "active_webhooks.json");
        assert!(config.owner.is_none());
        assert!(config.authorized_operators.is_empty());
    }

    #[test]
    fn operator_allow_list_is_case_insensitive() {
        let config: Config = toml::from_str(
            r#"
authorized_operators = ["Severswoed"]

[space]
name = "TestSpace"
"#,
        )
        .unwrap();
        assert!(config.operator_authorized("severswoed"));
        assert!(config.operator_authorized("SEVERSWOED"));
        assert!(!config.operator_authorized("intruder"));
    }

    #[test]
    fn owner_defaults_to_auto_assign() {
        let config: Config = toml::from_str(
            r#"
[space]
name = "TestSpace"

[owner]
username = "severswoed"
"#,
        )
        .unwrap();
        let owner = config.owner.unwrap();
        assert!(owner.auto_assign_admin);
    }
}
