//! wardend — community space provisioning and trust enforcement.
//!
//! Reconciles a declarative topology (roles, categories, channels, permission
//! overrides) against live remote state, screens joining members and inbound
//! messages, and manages a quarantine lifecycle. The remote platform is
//! reached exclusively through the [`gateway::Gateway`] trait; everything
//! above it is deterministic and testable in-process.

pub mod config;
pub mod directory;
pub mod error;
pub mod events;
pub mod gateway;
pub mod handlers;
pub mod provision;
pub mod security;
pub mod store;

pub use config::Config;
pub use directory::Directory;
pub use error::GatewayError;
pub use events::{Event, EventLoop};
pub use gateway::{Gateway, RecordingGateway};
pub use provision::PassReport;
pub use security::{TrustEngine, TrustState};
