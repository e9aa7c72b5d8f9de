//! Integration test common infrastructure.
//!
//! Provides a configured space fixture and a helper that runs the full
//! provisioning sequence (reconcile → enforce → webhooks) the way the binary
//! does, against the in-memory recording gateway.

use std::sync::Arc;

use chrono::Utc;
use wardend::config::Config;
use wardend::directory::Directory;
use wardend::gateway::RecordingGateway;
use wardend::provision::{self, PassReport, WebhookFailure};
use wardend::store::WebhookRecord;

/// Config with the stock topology plus two webhook mappings, one of which
/// targets a channel the topology does not declare.
pub fn fixture_config(snapshot_path: &std::path::Path) -> Arc<Config> {
    let toml = format!(
        r#"
authorized_operators = ["severswoed"]

[space]
name = "GlowStatus"
webhook_snapshot = "{}"

[owner]
username = "Severswoed"

[[webhooks.repositories]]
name = "GlowStatus"
owner = "Severswoed"
channel = "dev-updates"
events = ["push", "pull_request", "release", "issues"]

[[webhooks.repositories]]
name = "GlowStatus-site"
owner = "Severswoed"
channel = "missing-channel"
events = ["push"]
"#,
        snapshot_path.display()
    );
    Arc::new(toml::from_str(&toml).expect("fixture config parses"))
}

/// Outcome of one full provisioning run.
pub struct ProvisionRun {
    pub report: PassReport,
    pub directory: Directory,
    pub webhooks_created: Vec<WebhookRecord>,
    pub webhook_failures: Vec<WebhookFailure>,
}

/// Run reconcile + enforce + webhook provisioning, exactly one pass.
pub async fn run_provisioning(config: &Config, gateway: &RecordingGateway) -> ProvisionRun {
    let mut directory = Directory::fetch(gateway).await.expect("snapshot");
    let mut report = PassReport::default();

    report.merge(provision::reconcile(&config.topology, &mut directory, gateway).await);
    report.merge(
        provision::enforce(&config.topology, &config.moderation, &mut directory, gateway).await,
    );

    if let Some(owner) = &config.owner {
        provision::assign_owner_admin(owner, &config.topology, &directory, gateway, &mut report)
            .await;
    }

    let (webhooks_created, webhook_failures) = if config.webhooks.enabled {
        provision::provision(
            &config.webhooks.repositories,
            &directory,
            gateway,
            Utc::now(),
            &mut report,
        )
        .await
    } else {
        (Vec::new(), Vec::new())
    };

    ProvisionRun {
        report,
        directory,
        webhooks_created,
        webhook_failures,
    }
}
