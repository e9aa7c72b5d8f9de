//! Moderation configuration: verification level, content filter, slow-mode,
//! and auto-moderation toggles.

use serde::Deserialize;

use super::default_true;

/// Account verification gate required to participate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationLevel {
    None,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl VerificationLevel {
    /// Human-readable label for status output.
    pub fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }
}

/// Explicit-content filter scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFilter {
    Disabled,
    MembersWithoutRoles,
    AllMembers,
}

impl ContentFilter {
    pub fn label(self) -> &'static str {
        match self {
            Self::Disabled => "Disabled",
            Self::MembersWithoutRoles => "Members Without Roles",
            Self::AllMembers => "All Members",
        }
    }
}

/// Moderation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationConfig {
    /// Verification level applied to the space (default: medium).
    #[serde(default = "default_verification_level")]
    pub verification_level: VerificationLevel,
    /// Explicit-content filter scope (default: all members).
    #[serde(default = "default_content_filter")]
    pub content_filter: ContentFilter,
    /// Require a verified email to participate (default: true).
    #[serde(default = "default_true")]
    pub require_verified_email: bool,
    /// Slow-mode delay applied to protected channels, in seconds between
    /// messages per member (default: 5).
    #[serde(default = "default_rate_limit_per_user")]
    pub rate_limit_per_user: u32,
    /// Auto-moderation rule toggles.
    #[serde(default)]
    pub automod: AutoModConfig,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            verification_level: default_verification_level(),
            content_filter: default_content_filter(),
            require_verified_email: true,
            rate_limit_per_user: default_rate_limit_per_user(),
            automod: AutoModConfig::default(),
        }
    }
}

/// Auto-moderation rule toggles.
///
/// `block_spam` and `block_invites` are platform-native rules installed by the
/// platform client; the in-process message scorer consumes
/// `block_excessive_caps` and `block_suspicious_links`.
#[derive(Debug, Clone, Deserialize)]
pub struct AutoModConfig {
    /// Master switch (default: true). When false no rule fires.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub block_spam: bool,
    #[serde(default = "default_true")]
    pub block_invites: bool,
    #[serde(default = "default_true")]
    pub block_excessive_caps: bool,
    #[serde(default = "default_true")]
    pub block_suspicious_links: bool,
}

impl Default for AutoModConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            block_spam: true,
            block_invites: true,
            block_excessive_caps: true,
            block_suspicious_links: true,
        }
    }
}

fn default_verification_level() -> VerificationLevel {
    VerificationLevel::Medium
}

fn default_content_filter() -> ContentFilter {
    ContentFilter::AllMembers
}

fn default_rate_limit_per_user() -> u32 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_verification_level_is_medium() {
        assert_eq!(
            ModerationConfig::default().verification_level,
            VerificationLevel::Medium
        );
    }

    #[test]
    fn default_content_filter_is_all_members() {
        assert_eq!(
            ModerationConfig::default().content_filter,
            ContentFilter::AllMembers
        );
    }

    #[test]
    fn default_rate_limit_value() {
        assert_eq!(default_rate_limit_per_user(), 5);
    }

    #[test]
    fn automod_defaults_all_enabled() {
        let automod = AutoModConfig::default();
        assert!(automod.enabled);
        assert!(automod.block_spam);
        assert!(automod.block_invites);
        assert!(automod.block_excessive_caps);
        assert!(automod.block_suspicious_links);
    }

    #[test]
    fn levels_parse_from_snake_case() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            moderation: ModerationConfig,
        }
        let w: Wrapper = toml::from_str(
            r#"
[moderation]
verification_level = "very_high"
content_filter = "members_without_roles"
rate_limit_per_user = 10
"#,
        )
        .unwrap();
        assert_eq!(w.moderation.verification_level, VerificationLevel::VeryHigh);
        assert_eq!(
            w.moderation.content_filter,
            ContentFilter::MembersWithoutRoles
        );
        assert_eq!(w.moderation.rate_limit_per_user, 10);
    }

    #[test]
    fn labels_for_status_output() {
        assert_eq!(VerificationLevel::VeryHigh.label(), "Very High");
        assert_eq!(ContentFilter::AllMembers.label(), "All Members");
    }
}
