//! Provisioning passes: reconciliation, permission enforcement, webhooks.
//!
//! A pass converges remote state toward the declarative topology with
//! create-if-absent operations. Passes are best-effort: each operation is
//! fault-isolated, failures are collected rather than aborting siblings, and
//! there is no partial rollback — operations already applied stay applied,
//! and re-running the pass makes further progress.

pub mod owner;
pub mod permissions;
pub mod reconciler;
pub mod webhooks;

pub use owner::assign_owner_admin;
pub use permissions::enforce;
pub use reconciler::reconcile;
pub use webhooks::{WebhookFailure, private_report, provision, public_summary};

use std::fmt;

use crate::error::GatewayError;
use crate::gateway::{CategoryId, ChannelId, MemberId, OverrideTarget, RoleId};

/// One mutation applied during a pass.
#[derive(Debug, Clone, PartialEq)]
pub enum AppliedOp {
    RoleCreated { name: String, id: RoleId },
    CategoryCreated { name: String, id: CategoryId },
    ChannelCreated { name: String, id: ChannelId },
    OverrideSet { channel: String, target: OverrideTarget },
    SlowModeSet { channel: String, seconds: u32 },
    WebhookCreated { repository: String, channel: String },
    RoleAssigned { member: MemberId, role: String },
}

impl fmt::Display for AppliedOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoleCreated { name, .. } => write!(f, "created role {name}"),
            Self::CategoryCreated { name, .. } => write!(f, "created category {name}"),
            Self::ChannelCreated { name, .. } => write!(f, "created channel #{name}"),
            Self::OverrideSet { channel, target } => {
                write!(f, "set override on #{channel} for {target}")
            }
            Self::SlowModeSet { channel, seconds } => {
                write!(f, "set slow mode on #{channel} to {seconds}s")
            }
            Self::WebhookCreated { repository, channel } => {
                write!(f, "created webhook {repository} -> #{channel}")
            }
            Self::RoleAssigned { member, role } => {
                write!(f, "assigned role {role} to member {member}")
            }
        }
    }
}

/// One failed operation; the pass continued past it.
#[derive(Debug)]
pub struct PassFailure {
    /// What was being attempted, e.g. `create channel #rules`.
    pub operation: String,
    pub error: GatewayError,
}

/// Full operation log of a provisioning pass, handed to the caller to decide
/// whether to retry.
#[derive(Debug, Default)]
pub struct PassReport {
    pub applied: Vec<AppliedOp>,
    pub failures: Vec<PassFailure>,
}

impl PassReport {
    pub fn record(&mut self, op: AppliedOp) {
        tracing::info!(op = %op, "applied");
        self.applied.push(op);
    }

    pub fn record_failure(&mut self, operation: impl Into<String>, error: GatewayError) {
        let operation = operation.into();
        tracing::warn!(
            operation = %operation,
            error = %error,
            code = error.error_code(),
            "operation failed, continuing pass"
        );
        self.failures.push(PassFailure { operation, error });
    }

    pub fn merge(&mut self, other: PassReport) {
        self.applied.extend(other.applied);
        self.failures.extend(other.failures);
    }

    /// True when the pass found nothing to do and nothing failed — the remote
    /// state already matches the topology.
    pub fn is_converged(&self) -> bool {
        self.applied.is_empty() && self.failures.is_empty()
    }

    /// One-line summary for logs and command replies.
    pub fn summary(&self) -> String {
        format!(
            "{} operations applied, {} failed",
            self.applied.len(),
            self.failures.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_converged() {
        assert!(PassReport::default().is_converged());
    }

    #[test]
    fn recording_clears_convergence() {
        let mut report = PassReport::default();
        report.record(AppliedOp::RoleCreated {
            name: "✅ Verified".into(),
            id: RoleId(1),
        });
        assert!(!report.is_converged());
        assert_eq!(report.summary(), "1 operations applied, 0 failed");
    }

    #[test]
    fn failures_clear_convergence_too() {
        let mut report = PassReport::default();
        report.record_failure(
            "create channel #rules",
            GatewayError::Transient("timeout".into()),
        );
        assert!(!report.is_converged());
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn merge_concatenates_both_sides() {
        let mut a = PassReport::default();
        a.record(AppliedOp::CategoryCreated {
            name: "🟢 Info".into(),
            id: CategoryId(1),
        });
        let mut b = PassReport::default();
        b.record_failure("x", GatewayError::NotFound("y".into()));
        a.merge(b);
        assert_eq!(a.applied.len(), 1);
        assert_eq!(a.failures.len(), 1);
    }
}
