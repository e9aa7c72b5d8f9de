//! Webhook listing and reprovisioning commands.

use chrono::Utc;

use crate::provision::{self, PassReport};

use super::{Context, Reply};

/// List persisted webhook records. Endpoint URLs are deliberately omitted —
/// command replies may land in shared channels.
pub fn list_webhooks(ctx: &Context<'_>) -> Reply {
    let snapshot = match ctx.store.load() {
        Ok(snapshot) => snapshot,
        Err(err) => return format!("Could not read webhook snapshot: {err}").into(),
    };
    if snapshot.webhooks.is_empty() {
        return "No active webhooks found. Run setup first.".into();
    }
    let mut out = String::from("Active webhooks:\n");
    for record in &snapshot.webhooks {
        out.push_str(&format!(
            "  • {} -> #{} (events: {}; setup: {})\n",
            record.repository,
            record.channel,
            record.events.join(", "),
            record.setup_date.get(..10).unwrap_or(&record.setup_date),
        ));
    }
    out.into()
}

/// Recreate webhook endpoints for every configured mapping and append the new
/// records to the snapshot.
pub async fn reprovision_webhooks(ctx: &mut Context<'_>) -> Reply {
    if !ctx.config.webhooks.enabled {
        return "Webhook integration is disabled in configuration.".into();
    }
    let mut report = PassReport::default();
    let (created, failures) = provision::provision(
        &ctx.config.webhooks.repositories,
        ctx.directory,
        ctx.gateway,
        Utc::now(),
        &mut report,
    )
    .await;

    if let Err(err) = ctx.store.append(&created) {
        return format!(
            "Created {} endpoints but failed to persist the snapshot: {err}",
            created.len()
        )
        .into();
    }

    let mut out = format!(
        "Webhooks recreated: {} endpoints, {} failures.\n",
        created.len(),
        failures.len()
    );
    for failure in &failures {
        out.push_str(&format!("  ✗ {}: {}\n", failure.repository, failure.reason));
    }
    if !created.is_empty() {
        out.push_str(&provision::public_summary(&created));
    }
    out.into()
}
