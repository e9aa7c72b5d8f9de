//! Webhook snapshot persistence.
//!
//! One flat JSON document, `{"webhooks": [...]}`, append-only per
//! provisioning run. No schema versioning and no deduplication — the record
//! set is handed back to callers as-is.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One provisioned integration endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookRecord {
    /// Canonical "owner/name" repository slug.
    pub repository: String,
    /// Target channel name.
    pub channel: String,
    /// Secret endpoint URL. Never include this in broadcast output.
    pub webhook_url: String,
    /// Subscribed event set.
    pub events: Vec<String>,
    /// RFC 3339 creation timestamp.
    pub setup_date: String,
}

/// The persisted document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookSnapshot {
    pub webhooks: Vec<WebhookRecord>,
}

/// Persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Flat-file webhook store.
pub struct WebhookStore {
    path: PathBuf,
}

impl WebhookStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load the snapshot; a missing file reads as empty.
    pub fn load(&self) -> Result<WebhookSnapshot, StoreError> {
        if !self.path.exists() {
            return Ok(WebhookSnapshot::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Append new records and write the snapshot back.
    pub fn append(&self, new_records: &[WebhookRecord]) -> Result<WebhookSnapshot, StoreError> {
        let mut snapshot = self.load()?;
        snapshot.webhooks.extend(new_records.iter().cloned());
        let content = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(&self.path, content)?;
        Ok(snapshot)
    }
}
