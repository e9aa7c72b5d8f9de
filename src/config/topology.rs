//! Declarative target topology.
//!
//! A [`TopologySpec`] is the desired end state for roles, categories,
//! channels, and the protected / bot-allowed channel classification. The
//! reconciler converges remote state toward it with create-if-absent
//! operations; nothing here talks to the network.
//!
//! The `Default` impl carries the stock community layout so a bare config
//! file provisions a complete space.

use serde::Deserialize;

use crate::gateway::Permission;

/// Display name of the moderation category that holds the quarantine channel.
pub const MODERATION_CATEGORY: &str = "🔒 Moderation";

/// Name of the quarantine holding channel.
pub const QUARANTINE_CHANNEL: &str = "quarantine";

/// Topic of the quarantine holding channel.
pub const QUARANTINE_CHANNEL_TOPIC: &str = "Temporary holding area for new/suspicious accounts";

// Well-known role keys resolved by the enforcer and handlers.
const ADMIN_KEY: &str = "admin";
const VERIFIED_KEY: &str = "verified";
const TRUSTED_BOTS_KEY: &str = "trusted_bots";
const QUARANTINE_KEY: &str = "quarantine";

/// One role definition.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleDef {
    /// Stable key used by other config sections and the enforcer.
    pub key: String,
    /// Display name as created on the platform.
    pub name: String,
    /// RGB color.
    pub color: u32,
    /// Permissions granted at creation time.
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// One channel definition inside a category.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelDef {
    pub name: String,
    pub description: String,
}

/// One category owning an ordered sequence of channels.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDef {
    pub key: String,
    pub channels: Vec<ChannelDef>,
}

/// Declarative target state for the whole space.
#[derive(Debug, Clone, Deserialize)]
pub struct TopologySpec {
    /// Ordered role definitions.
    #[serde(default = "default_roles")]
    pub roles: Vec<RoleDef>,
    /// Ordered categories, each owning its channels.
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryDef>,
    /// Channels with deny-by-default rules for automation and quarantined
    /// members. Must be disjoint from `bot_allowed_channels`.
    #[serde(default = "default_protected_channels")]
    pub protected_channels: Vec<String>,
    /// Channels with explicit allow overrides for automation.
    #[serde(default = "default_bot_allowed_channels")]
    pub bot_allowed_channels: Vec<String>,
}

impl Default for TopologySpec {
    fn default() -> Self {
        Self {
            roles: default_roles(),
            categories: default_categories(),
            protected_channels: default_protected_channels(),
            bot_allowed_channels: default_bot_allowed_channels(),
        }
    }
}

impl TopologySpec {
    /// Look up a role definition by its stable key.
    pub fn role_by_key(&self, key: &str) -> Option<&RoleDef> {
        self.roles.iter().find(|r| r.key == key)
    }

    pub fn admin_role(&self) -> Option<&RoleDef> {
        self.role_by_key(ADMIN_KEY)
    }

    pub fn verified_role(&self) -> Option<&RoleDef> {
        self.role_by_key(VERIFIED_KEY)
    }

    pub fn trusted_bots_role(&self) -> Option<&RoleDef> {
        self.role_by_key(TRUSTED_BOTS_KEY)
    }

    pub fn quarantine_role(&self) -> Option<&RoleDef> {
        self.role_by_key(QUARANTINE_KEY)
    }

    /// All channel names declared across every category.
    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .flat_map(|c| c.channels.iter().map(|ch| ch.name.as_str()))
    }
}

/// Emoji prefix for a category key; empty for keys not in the table.
fn category_emoji(key: &str) -> &'static str {
    match key {
        "info" => "🟢",
        "support" => "🔧",
        "development" => "🔨",
        "lounge" => "☕",
        _ => "",
    }
}

/// Display name for a category: `"<emoji> <Title-Cased key>"`.
///
/// Keys outside the emoji table keep the leading separator (`" Ops"`), which
/// matches how names were historically derived; existence checks use the same
/// derivation, so the round trip stays consistent.
pub fn category_display_name(key: &str) -> String {
    format!("{} {}", category_emoji(key), title_case(key))
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            out.extend(ch.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

fn default_roles() -> Vec<RoleDef> {
    use Permission::*;
    let role = |key: &str, name: &str, color: u32, permissions: Vec<Permission>| RoleDef {
        key: key.to_string(),
        name: name.to_string(),
        color,
        permissions,
    };
    vec![
        role("admin", "🛡️ Admin", 0xFF0000, vec![Administrator]),
        role(
            "moderator",
            "🔨 Moderator",
            0xFF6600,
            vec![ManageMessages, ManageChannels, KickMembers, BanMembers],
        ),
        role("sponsor", "✨ Sponsor", 0xFFD700, vec![EmbedLinks, AttachFiles]),
        role("beta_tester", "🧪 Beta Tester", 0x9932CC, vec![EmbedLinks]),
        role(
            "dev_team",
            "⚙️ Dev Team",
            0xFF4500,
            vec![ManageMessages, EmbedLinks, AttachFiles],
        ),
        role("support", "🖥️ Support", 0x00CED1, vec![ManageMessages]),
        role("verified", "✅ Verified", 0x00FF00, vec![]),
        role(
            "trusted_bots",
            "🤖 Trusted Bots",
            0x808080,
            vec![EmbedLinks, AttachFiles],
        ),
        role("quarantine", "⚠️ Quarantine", 0x800000, vec![]),
    ]
}

fn default_categories() -> Vec<CategoryDef> {
    let chan = |name: &str, description: &str| ChannelDef {
        name: name.to_string(),
        description: description.to_string(),
    };
    vec![
        CategoryDef {
            key: "info".to_string(),
            channels: vec![
                chan("welcome", "Quick intro + project links"),
                chan("rules", "Code of conduct"),
                chan("announcements", "Releases, roadmap updates"),
            ],
        },
        CategoryDef {
            key: "support".to_string(),
            channels: vec![
                chan("setup-help", "Troubleshooting and questions"),
                chan("feature-requests", "Community ideas and feedback"),
                chan("integration-requests", "Ask for brand support"),
            ],
        },
        CategoryDef {
            key: "development".to_string(),
            channels: vec![
                chan("dev-updates", "Auto post from GitHub"),
                chan("cli-version-v1", "v1 CLI questions/support"),
                chan("app-version-v2", "v2 GUI installer questions/support"),
                chan("api-dev", "Endpoint discussion"),
            ],
        },
        CategoryDef {
            key: "lounge".to_string(),
            channels: vec![
                chan("general", "Chit-chat"),
                chan("show-your-glow", "Users post pics of their setup"),
            ],
        },
    ]
}

fn default_protected_channels() -> Vec<String> {
    ["welcome", "rules", "general", "show-your-glow", "feature-requests"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_bot_allowed_channels() -> Vec<String> {
    ["dev-updates", "announcements"]
        .into_iter()
        .map(String::from)
        .collect()
}
