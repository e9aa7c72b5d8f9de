//! wardend — community space provisioning and trust enforcement daemon.
//!
//! Actions are selected via `WARDEND_ACTION`:
//! - `plan` (default): run a full dry-run provisioning pass against an empty
//!   in-memory space and report every operation it would apply
//! - `check`: load and validate configuration, then exit

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use wardend::config::{Config, validate};
use wardend::directory::Directory;
use wardend::gateway::RecordingGateway;
use wardend::provision::{self, PassReport};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "wardend.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    // Topology invariants are rejected here, before any mutation could be
    // attempted against a live space.
    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "configuration invalid");
        }
        anyhow::bail!("configuration failed validation with {} error(s)", errors.len());
    }

    let action = std::env::var("WARDEND_ACTION").unwrap_or_else(|_| "plan".to_string());
    info!(space = %config.space.name, action = %action, "Starting wardend");

    match action.as_str() {
        "check" => {
            info!(path = %config_path, "configuration is valid");
            Ok(())
        }
        "plan" => {
            require_authorized_operator(&config)?;
            plan(&config).await;
            Ok(())
        }
        other => anyhow::bail!("unknown action: {other} (expected plan or check)"),
    }
}

/// Thin operator gate: mutating actions require a name from the allow-list.
/// Real authorization depth belongs to the platform client.
fn require_authorized_operator(config: &Config) -> anyhow::Result<()> {
    if config.authorized_operators.is_empty() {
        warn!("no authorized_operators configured, skipping operator gate");
        return Ok(());
    }
    let operator = std::env::var("WARDEND_OPERATOR").unwrap_or_default();
    if config.operator_authorized(&operator) {
        info!(operator = %operator, "operator authorized");
        Ok(())
    } else {
        error!(operator = %operator, "operator is not on the allow-list");
        anyhow::bail!("unauthorized operator")
    }
}

/// Dry-run provisioning pass against an empty in-memory space: reconcile,
/// enforce permissions, provision webhooks, and report what would be applied.
async fn plan(config: &Config) {
    let gateway = Arc::new(RecordingGateway::new());
    let mut directory = match Directory::fetch(gateway.as_ref()).await {
        Ok(directory) => directory,
        Err(err) => {
            error!(error = %err, "could not snapshot planning space");
            return;
        }
    };

    let mut report = PassReport::default();
    report.merge(provision::reconcile(&config.topology, &mut directory, gateway.as_ref()).await);
    report.merge(
        provision::enforce(
            &config.topology,
            &config.moderation,
            &mut directory,
            gateway.as_ref(),
        )
        .await,
    );

    if let Some(owner) = &config.owner {
        provision::assign_owner_admin(
            owner,
            &config.topology,
            &directory,
            gateway.as_ref(),
            &mut report,
        )
        .await;
    }

    if config.webhooks.enabled {
        let (created, failures) = provision::provision(
            &config.webhooks.repositories,
            &directory,
            gateway.as_ref(),
            Utc::now(),
            &mut report,
        )
        .await;
        info!(
            created = created.len(),
            failed = failures.len(),
            "webhook plan computed (dry-run, snapshot not written)"
        );
        for failure in &failures {
            warn!(repository = %failure.repository, reason = %failure.reason, "webhook mapping would fail");
        }
    }

    // Each operation was already logged as it was recorded.
    info!(summary = %report.summary(), "plan complete");
}
