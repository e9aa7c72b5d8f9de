//! Channel permission enforcement.
//!
//! Applies the per-channel access-control matrices derived from the
//! protected / bot-allowed classification, plus quarantine isolation:
//!
//! - protected channels deny the automation and quarantine roles and get a
//!   slow-mode delay
//! - bot-allowed channels grant automation an explicit allow (the sets are
//!   disjoint by topology invariant, so the grant never fights a deny)
//! - a dedicated quarantine channel is hidden from everyone and visible to
//!   the quarantine role only
//!
//! Every override write replaces the full tuple for its (channel, target)
//! pair, so applying the same matrix twice is a no-op in effect.

use tracing::debug;

use crate::config::{
    MODERATION_CATEGORY, ModerationConfig, QUARANTINE_CHANNEL, QUARANTINE_CHANNEL_TOPIC,
    TopologySpec,
};
use crate::directory::Directory;
use crate::error::GatewayError;
use crate::gateway::{ChannelId, Gateway, OverrideTarget, PermissionFlags, RoleId};

use super::{AppliedOp, PassReport};

/// Run one permission enforcement pass. Assumes reconciliation already ran in
/// this provisioning run (roles and channels resolve through `directory`).
pub async fn enforce(
    topology: &TopologySpec,
    moderation: &ModerationConfig,
    directory: &mut Directory,
    gateway: &dyn Gateway,
) -> PassReport {
    let mut report = PassReport::default();

    let bots_role = resolve_role(topology.trusted_bots_role().map(|r| r.name.as_str()), directory);
    let quarantine_role =
        resolve_role(topology.quarantine_role().map(|r| r.name.as_str()), directory);

    for name in &topology.protected_channels {
        let Some(channel) = directory.find_channel(name) else {
            report.record_failure(
                format!("secure channel #{name}"),
                GatewayError::NotFound(format!("channel {name}")),
            );
            continue;
        };
        let channel_id = channel.id;

        if let Some(role) = bots_role {
            set_override(
                gateway,
                &mut report,
                channel_id,
                name,
                OverrideTarget::Role(role),
                PermissionFlags::deny_automation(),
            )
            .await;
        }
        if let Some(role) = quarantine_role {
            set_override(
                gateway,
                &mut report,
                channel_id,
                name,
                OverrideTarget::Role(role),
                PermissionFlags::deny_quarantined(),
            )
            .await;
        }

        match gateway
            .edit_slow_mode(channel_id, moderation.rate_limit_per_user)
            .await
        {
            Ok(()) => report.record(AppliedOp::SlowModeSet {
                channel: name.clone(),
                seconds: moderation.rate_limit_per_user,
            }),
            Err(err) => report.record_failure(format!("set slow mode on #{name}"), err),
        }
    }

    if let Some(role) = bots_role {
        for name in &topology.bot_allowed_channels {
            let Some(channel) = directory.find_channel(name) else {
                report.record_failure(
                    format!("allow automation in #{name}"),
                    GatewayError::NotFound(format!("channel {name}")),
                );
                continue;
            };
            set_override(
                gateway,
                &mut report,
                channel.id,
                name,
                OverrideTarget::Role(role),
                PermissionFlags::allow_automation(),
            )
            .await;
        }
    } else {
        debug!("automation role unresolved, skipping bot-allowed grants");
    }

    if let Some(role) = quarantine_role {
        isolate_quarantine_channel(directory, gateway, role, &mut report).await;
    } else {
        debug!("quarantine role unresolved, skipping isolation channel");
    }

    report
}

/// Ensure the quarantine holding channel exists under the moderation
/// category, visible exclusively to the quarantine role (plus moderators via
/// role-level permissions).
async fn isolate_quarantine_channel(
    directory: &mut Directory,
    gateway: &dyn Gateway,
    quarantine_role: RoleId,
    report: &mut PassReport,
) {
    let channel_id = match directory.find_channel(QUARANTINE_CHANNEL) {
        Some(existing) => existing.id,
        None => {
            let category_id = match directory.find_category(MODERATION_CATEGORY) {
                Some(existing) => existing.id,
                None => match gateway.create_category(MODERATION_CATEGORY).await {
                    Ok(id) => {
                        directory.record_category(id, MODERATION_CATEGORY);
                        report.record(AppliedOp::CategoryCreated {
                            name: MODERATION_CATEGORY.to_string(),
                            id,
                        });
                        id
                    }
                    Err(err) => {
                        report.record_failure(
                            format!("create category {MODERATION_CATEGORY}"),
                            err,
                        );
                        return;
                    }
                },
            };
            match gateway
                .create_channel(QUARANTINE_CHANNEL, category_id, QUARANTINE_CHANNEL_TOPIC)
                .await
            {
                Ok(id) => {
                    directory.record_channel(id, QUARANTINE_CHANNEL, category_id);
                    report.record(AppliedOp::ChannelCreated {
                        name: QUARANTINE_CHANNEL.to_string(),
                        id,
                    });
                    id
                }
                Err(err) => {
                    report.record_failure(format!("create channel #{QUARANTINE_CHANNEL}"), err);
                    return;
                }
            }
        }
    };

    set_override(
        gateway,
        report,
        channel_id,
        QUARANTINE_CHANNEL,
        OverrideTarget::Everyone,
        PermissionFlags::hide(),
    )
    .await;
    set_override(
        gateway,
        report,
        channel_id,
        QUARANTINE_CHANNEL,
        OverrideTarget::Role(quarantine_role),
        PermissionFlags::view_and_send(),
    )
    .await;
}

fn resolve_role(name: Option<&str>, directory: &Directory) -> Option<RoleId> {
    let name = name?;
    let found = directory.find_role(name).map(|r| r.id);
    if found.is_none() {
        debug!(role = %name, "role not present in directory");
    }
    found
}

async fn set_override(
    gateway: &dyn Gateway,
    report: &mut PassReport,
    channel: ChannelId,
    channel_name: &str,
    target: OverrideTarget,
    flags: PermissionFlags,
) {
    match gateway.set_permission_override(channel, target, flags).await {
        Ok(()) => report.record(AppliedOp::OverrideSet {
            channel: channel_name.to_string(),
            target,
        }),
        Err(err) => report.record_failure(
            format!("set override on #{channel_name} for {target}"),
            err,
        ),
    }
}
