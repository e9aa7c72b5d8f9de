//! Trust and channel moderation commands.

use tracing::info;

use crate::gateway::{MemberId, OverrideTarget, PermissionFlags, RoleId};
use crate::security::{QuarantineOutcome, ReleaseOutcome, VerifyOutcome};

use super::{Context, Reply};

/// Quarantine a suspicious member.
pub async fn quarantine(ctx: &mut Context<'_>, member: MemberId, reason: &str) -> Reply {
    let Some(role) = resolve_role(ctx, |t| t.quarantine_role().map(|r| r.name.clone())) else {
        return "Quarantine role not found!".into();
    };
    match ctx.trust.quarantine(member, reason) {
        QuarantineOutcome::AlreadyQuarantined => {
            format!("Member {member} is already quarantined. Reason noted: {reason}").into()
        }
        QuarantineOutcome::Applied => {
            if let Err(err) = ctx.gateway.add_role(member, role).await {
                return format!("Could not apply quarantine role: {err}").into();
            }
            info!(member = %member, reason = %reason, "member quarantined");
            format!("Member {member} has been quarantined. Reason: {reason}").into()
        }
    }
}

/// Release a member from quarantine, marking them verified.
pub async fn unquarantine(ctx: &mut Context<'_>, member: MemberId) -> Reply {
    match ctx.trust.unquarantine(member) {
        ReleaseOutcome::NotQuarantined => format!("Member {member} is not quarantined.").into(),
        ReleaseOutcome::Released => {
            let quarantine_role =
                resolve_role(ctx, |t| t.quarantine_role().map(|r| r.name.clone()));
            let verified_role = resolve_role(ctx, |t| t.verified_role().map(|r| r.name.clone()));

            if let Some(role) = quarantine_role
                && let Err(err) = ctx.gateway.remove_role(member, role).await
            {
                return format!("Released, but could not remove quarantine role: {err}").into();
            }
            if let Some(role) = verified_role
                && let Err(err) = ctx.gateway.add_role(member, role).await
            {
                return format!("Released, but could not add verified role: {err}").into();
            }
            format!("Member {member} has been released from quarantine and verified.").into()
        }
    }
}

/// Manually verify a member, bypassing quarantine.
pub async fn verify(ctx: &mut Context<'_>, member: MemberId) -> Reply {
    let Some(role) = resolve_role(ctx, |t| t.verified_role().map(|r| r.name.clone())) else {
        return "Verified role not found!".into();
    };
    match ctx.trust.verify(member) {
        VerifyOutcome::AlreadyVerified => format!("Member {member} is already verified.").into(),
        VerifyOutcome::Verified => {
            if let Err(err) = ctx.gateway.add_role(member, role).await {
                return format!("Could not apply verified role: {err}").into();
            }
            format!("Member {member} has been manually verified.").into()
        }
    }
}

/// Lock a channel: everyone loses send.
pub async fn lockdown(ctx: &mut Context<'_>, channel: &str) -> Reply {
    let Some(found) = ctx.directory.find_channel(channel) else {
        return format!("Channel #{channel} not found.").into();
    };
    match ctx
        .gateway
        .set_permission_override(found.id, OverrideTarget::Everyone, PermissionFlags::deny_send())
        .await
    {
        Ok(()) => format!("#{channel} has been locked down.").into(),
        Err(err) => format!("Could not lock #{channel}: {err}").into(),
    }
}

/// Unlock a channel: clear the everyone override back to inherit.
pub async fn unlock(ctx: &mut Context<'_>, channel: &str) -> Reply {
    let Some(found) = ctx.directory.find_channel(channel) else {
        return format!("Channel #{channel} not found.").into();
    };
    match ctx
        .gateway
        .set_permission_override(found.id, OverrideTarget::Everyone, PermissionFlags::inherit())
        .await
    {
        Ok(()) => format!("#{channel} has been unlocked.").into(),
        Err(err) => format!("Could not unlock #{channel}: {err}").into(),
    }
}

/// Grant the admin role to a member.
pub async fn assign_admin(ctx: &mut Context<'_>, member: MemberId) -> Reply {
    let Some(role) = resolve_role(ctx, |t| t.admin_role().map(|r| r.name.clone())) else {
        return "Admin role not found!".into();
    };
    if member_has_role(ctx, member, role) {
        return format!("Member {member} already has admin privileges.").into();
    }
    match ctx.gateway.add_role(member, role).await {
        Ok(()) => {
            info!(member = %member, "admin role assigned");
            format!("Assigned admin privileges to member {member}.").into()
        }
        Err(err) => format!("Could not assign admin role: {err}").into(),
    }
}

fn resolve_role(
    ctx: &Context<'_>,
    pick: impl Fn(&crate::config::TopologySpec) -> Option<String>,
) -> Option<RoleId> {
    let name = pick(&ctx.config.topology)?;
    ctx.directory.find_role(&name).map(|r| r.id)
}

fn member_has_role(ctx: &Context<'_>, member: MemberId, role: RoleId) -> bool {
    ctx.directory
        .member(member)
        .is_some_and(|m| m.roles.contains(&role))
}
