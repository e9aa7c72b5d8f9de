//! Unified error handling for wardend.
//!
//! Remote operations fail in three ways that matter to callers: the referenced
//! entity does not exist, the platform rejected the operation, or the failure
//! is transient (network / rate-limit class). Provisioning passes treat all
//! three as non-fatal per operation; the caller decides whether to re-run.

use thiserror::Error;

/// Errors returned by the remote platform gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Referenced role/channel/member does not exist. Skip and log.
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation rejected by the remote permission model. Surfaced to the
    /// initiating caller, never retried here.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Network or rate-limit class failure. The caller may retry the whole
    /// pass; this crate performs no automatic retry.
    #[error("transient remote failure: {0}")]
    Transient(String),
}

impl GatewayError {
    /// Stable code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Unauthorized(_) => "unauthorized",
            Self::Transient(_) => "transient",
        }
    }

    /// Whether re-running the pass could make further progress.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
