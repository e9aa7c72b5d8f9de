//! Webhook provisioning.
//!
//! Creates one integration endpoint per (repository, channel) mapping and
//! captures the resulting records. Depends on reconciliation having created
//! the target channels first; an unresolvable channel is a recorded failure,
//! not an abort.
//!
//! Disclosure contract: endpoint URLs are secrets. [`private_report`] is the
//! only output allowed to carry them; [`public_summary`] is safe for a
//! broadcast channel and never contains a URL.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::RepositoryMapping;
use crate::directory::Directory;
use crate::gateway::Gateway;
use crate::store::WebhookRecord;

use super::{AppliedOp, PassReport};

/// One mapping the pass could not provision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookFailure {
    pub repository: String,
    pub reason: String,
}

/// Provision endpoints for every mapping, best-effort.
///
/// Returns the newly created records plus the failures; merging with
/// previously persisted records (and deduplication) is the caller's concern.
pub async fn provision(
    repositories: &[RepositoryMapping],
    directory: &Directory,
    gateway: &dyn Gateway,
    now: DateTime<Utc>,
    report: &mut PassReport,
) -> (Vec<WebhookRecord>, Vec<WebhookFailure>) {
    let mut created = Vec::new();
    let mut failures = Vec::new();

    for repo in repositories {
        let Some(channel) = directory.find_channel(&repo.channel) else {
            failures.push(WebhookFailure {
                repository: repo.slug(),
                reason: format!("channel #{} not found", repo.channel),
            });
            continue;
        };

        let endpoint_name = format!("GitHub-{}", repo.name);
        match gateway
            .create_integration_endpoint(channel.id, &endpoint_name)
            .await
        {
            Ok(url) => {
                info!(
                    repository = %repo.slug(),
                    channel = %repo.channel,
                    "created webhook endpoint"
                );
                report.record(AppliedOp::WebhookCreated {
                    repository: repo.slug(),
                    channel: repo.channel.clone(),
                });
                created.push(WebhookRecord {
                    repository: repo.slug(),
                    channel: repo.channel.clone(),
                    webhook_url: url,
                    events: repo.events.clone(),
                    setup_date: now.to_rfc3339(),
                });
            }
            Err(err) => {
                failures.push(WebhookFailure {
                    repository: repo.slug(),
                    reason: err.to_string(),
                });
            }
        }
    }

    if !failures.is_empty() {
        tracing::warn!(count = failures.len(), "webhook mappings failed");
    }
    (created, failures)
}

/// Full disclosure for the authorized principal: includes the secret URLs.
pub fn private_report(records: &[WebhookRecord]) -> String {
    let mut out = String::from("Webhook endpoints (CONFIDENTIAL — do not share):\n");
    for record in records {
        out.push_str(&format!(
            "  {} -> #{}\n    url: {}\n    events: {}\n",
            record.repository,
            record.channel,
            record.webhook_url,
            record.events.join(", ")
        ));
    }
    out
}

/// Broadcast-safe summary: repositories, channels, and events only.
pub fn public_summary(records: &[WebhookRecord]) -> String {
    let mut out = String::from("Repository integrations configured:\n");
    for record in records {
        out.push_str(&format!(
            "  • {} -> #{} ({})\n",
            record.repository,
            record.channel,
            record.events.join(", ")
        ));
    }
    out.push_str("Endpoint configuration was delivered privately.\n");
    out
}
