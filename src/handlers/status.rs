//! Security status summary.

use super::{Context, Reply};

/// Snapshot of the space's security posture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityStatus {
    pub verification_level: &'static str,
    pub content_filter: &'static str,
    pub member_count: usize,
    pub quarantined_members: usize,
    pub automod_enabled: bool,
}

impl SecurityStatus {
    pub fn render(&self) -> String {
        format!(
            "Security Status\n\
             Verification Level: {}\n\
             Content Filter: {}\n\
             Members: {}\n\
             Quarantined: {}\n\
             Auto-Moderation: {}",
            self.verification_level,
            self.content_filter,
            self.member_count,
            self.quarantined_members,
            if self.automod_enabled { "enabled" } else { "disabled" },
        )
    }
}

/// Build and render the current security status.
pub fn security_status(ctx: &Context<'_>) -> Reply {
    let moderation = &ctx.config.moderation;
    let status = SecurityStatus {
        verification_level: moderation.verification_level.label(),
        content_filter: moderation.content_filter.label(),
        member_count: ctx.directory.member_count(),
        quarantined_members: ctx.trust.quarantined_count(),
        automod_enabled: moderation.automod.enabled,
    };
    status.render().into()
}
