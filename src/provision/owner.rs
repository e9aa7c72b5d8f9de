//! Owner privilege assignment.
//!
//! Finds the configured owner among current members (pure case-insensitive
//! lookup — the configuration value itself is never mutated) and grants the
//! admin role if they don't already hold it.

use tracing::{debug, warn};

use crate::config::{OwnerConfig, TopologySpec};
use crate::directory::Directory;
use crate::error::GatewayError;
use crate::gateway::Gateway;

use super::{AppliedOp, PassReport};

/// Grant the admin role to the configured owner, create-if-absent style.
pub async fn assign_owner_admin(
    owner: &OwnerConfig,
    topology: &TopologySpec,
    directory: &Directory,
    gateway: &dyn Gateway,
    report: &mut PassReport,
) {
    if !owner.auto_assign_admin {
        return;
    }

    let Some(member) = directory.find_member_named(&owner.username) else {
        warn!(owner = %owner.username, "owner not found among members");
        report.record_failure(
            format!("assign admin to owner {}", owner.username),
            GatewayError::NotFound(format!("member {}", owner.username)),
        );
        return;
    };

    let Some(admin_name) = topology.admin_role().map(|r| r.name.as_str()) else {
        report.record_failure(
            format!("assign admin to owner {}", owner.username),
            GatewayError::NotFound("admin role definition".to_string()),
        );
        return;
    };
    let Some(role) = directory.find_role(admin_name) else {
        report.record_failure(
            format!("assign admin to owner {}", owner.username),
            GatewayError::NotFound(format!("role {admin_name}")),
        );
        return;
    };

    if member.roles.contains(&role.id) {
        debug!(owner = %owner.username, "owner already has admin role");
        return;
    }

    match gateway.add_role(member.id, role.id).await {
        Ok(()) => report.record(AppliedOp::RoleAssigned {
            member: member.id,
            role: admin_name.to_string(),
        }),
        Err(err) => {
            report.record_failure(format!("assign admin to owner {}", owner.username), err)
        }
    }
}
