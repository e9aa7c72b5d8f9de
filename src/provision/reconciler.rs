//! Topology reconciliation.
//!
//! Converges remote roles, categories, and channels toward the declarative
//! topology. Everything is create-if-absent, keyed by exact display name:
//! an existing role is never edited (first-write-wins — re-running after a
//! manual color or permission change does not revert it), and a second run
//! over converged state applies zero operations.

use tracing::debug;

use crate::config::{TopologySpec, category_display_name};
use crate::directory::Directory;
use crate::gateway::{Gateway, RoleSpec};

use super::{AppliedOp, PassReport};

/// Run one reconciliation pass.
///
/// Created entities are recorded back into `directory` so later steps of the
/// same provisioning run (permission enforcement, webhooks) can resolve them
/// without a re-fetch.
pub async fn reconcile(
    topology: &TopologySpec,
    directory: &mut Directory,
    gateway: &dyn Gateway,
) -> PassReport {
    let mut report = PassReport::default();

    for role in &topology.roles {
        if directory.find_role(&role.name).is_some() {
            debug!(role = %role.name, "role exists, skipping");
            continue;
        }
        let spec = RoleSpec {
            name: role.name.clone(),
            color: role.color,
            permissions: role.permissions.clone(),
        };
        match gateway.create_role(&spec).await {
            Ok(id) => {
                directory.record_role(id, &role.name);
                report.record(AppliedOp::RoleCreated {
                    name: role.name.clone(),
                    id,
                });
            }
            Err(err) => report.record_failure(format!("create role {}", role.name), err),
        }
    }

    for category in &topology.categories {
        let display_name = category_display_name(&category.key);
        let category_id = match directory.find_category(&display_name) {
            Some(existing) => {
                debug!(category = %display_name, "category exists, skipping");
                existing.id
            }
            None => match gateway.create_category(&display_name).await {
                Ok(id) => {
                    directory.record_category(id, &display_name);
                    report.record(AppliedOp::CategoryCreated {
                        name: display_name.clone(),
                        id,
                    });
                    id
                }
                Err(err) => {
                    // Without the category its channels have no parent to be
                    // created under; skip them and let a re-run pick them up.
                    report.record_failure(format!("create category {display_name}"), err);
                    continue;
                }
            },
        };

        for channel in &category.channels {
            // Channel lookup is global, not scoped to the category. A name
            // collision across categories is treated as already existing and
            // skipped; topology validation keeps names unique so this only
            // matters for out-of-band state.
            if directory.find_channel(&channel.name).is_some() {
                debug!(channel = %channel.name, "channel exists, skipping");
                continue;
            }
            match gateway
                .create_channel(&channel.name, category_id, &channel.description)
                .await
            {
                Ok(id) => {
                    directory.record_channel(id, &channel.name, category_id);
                    report.record(AppliedOp::ChannelCreated {
                        name: channel.name.clone(),
                        id,
                    });
                }
                Err(err) => {
                    report.record_failure(format!("create channel #{}", channel.name), err)
                }
            }
        }
    }

    report
}
