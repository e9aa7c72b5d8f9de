//! Repository integration webhook configuration.

use serde::Deserialize;

use super::default_true;

/// Webhook integration settings.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Master switch (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Repository-to-channel mappings to provision.
    #[serde(default)]
    pub repositories: Vec<RepositoryMapping>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            repositories: Vec::new(),
        }
    }
}

/// One repository whose events feed a channel.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryMapping {
    /// Repository name (e.g., "GlowStatus").
    pub name: String,
    /// Repository owner (e.g., "Severswoed").
    pub owner: String,
    /// Target channel name, resolved through the Directory at provisioning
    /// time.
    pub channel: String,
    /// Subscribed event set (e.g., "push", "release").
    #[serde(default)]
    pub events: Vec<String>,
}

impl RepositoryMapping {
    /// Canonical "owner/name" form used in records and reports.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}
