//! Capability interface to the remote chat platform.
//!
//! The [`Gateway`] trait is the single seam between this crate's decision
//! logic and the platform client that actually talks to the network. Every
//! method is one remote read or one remote mutation; decision logic never
//! suspends, so these calls are the only await points in the system.
//!
//! [`RecordingGateway`] is the in-memory implementation used by the dry-run
//! planner and by tests: it applies mutations to its own entity tables and
//! keeps an ordered log of every call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{GatewayError, GatewayResult};

// ============================================================================
// Entity identities
// ============================================================================

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(
    /// Remote identity of a role.
    RoleId
);
entity_id!(
    /// Remote identity of a category.
    CategoryId
);
entity_id!(
    /// Remote identity of a channel.
    ChannelId
);
entity_id!(
    /// Remote identity of a member.
    MemberId
);
entity_id!(
    /// Remote identity of a message.
    MessageId
);

// ============================================================================
// Entity snapshots (as returned by the read interface)
// ============================================================================

/// A role as seen on the remote platform.
#[derive(Debug, Clone)]
pub struct RemoteRole {
    pub id: RoleId,
    pub name: String,
}

/// A category as seen on the remote platform.
#[derive(Debug, Clone)]
pub struct RemoteCategory {
    pub id: CategoryId,
    pub name: String,
}

/// A channel as seen on the remote platform.
#[derive(Debug, Clone)]
pub struct RemoteChannel {
    pub id: ChannelId,
    pub name: String,
    pub category: Option<CategoryId>,
}

/// A member as seen on the remote platform.
#[derive(Debug, Clone)]
pub struct RemoteMember {
    pub id: MemberId,
    pub name: String,
    pub roles: Vec<RoleId>,
    pub account_created: DateTime<Utc>,
}

// ============================================================================
// Mutation inputs
// ============================================================================

/// Permissions grantable to a role at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Administrator,
    ManageMessages,
    ManageChannels,
    KickMembers,
    BanMembers,
    EmbedLinks,
    AttachFiles,
}

/// Specification for creating a role.
#[derive(Debug, Clone)]
pub struct RoleSpec {
    pub name: String,
    /// RGB color, e.g. 0xFF6600.
    pub color: u32,
    pub permissions: Vec<Permission>,
}

/// Target of a per-channel permission override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideTarget {
    /// The platform's default role (everyone).
    Everyone,
    Role(RoleId),
}

impl fmt::Display for OverrideTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Everyone => write!(f, "everyone"),
            Self::Role(id) => write!(f, "role:{id}"),
        }
    }
}

/// Ternary permission flags for a (channel, target) override.
///
/// `None` means inherit from the role/category level. A write fully replaces
/// the prior tuple for the pair; overrides are last-write-wins, never additive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermissionFlags {
    pub view: Option<bool>,
    pub send: Option<bool>,
    pub embed: Option<bool>,
    pub attach: Option<bool>,
    pub react: Option<bool>,
}

impl PermissionFlags {
    /// All-inherit tuple. Writing it clears any previous override for the pair.
    pub fn inherit() -> Self {
        Self::default()
    }

    /// Deny posting surface for untrusted automation in protected channels.
    pub fn deny_automation() -> Self {
        Self {
            send: Some(false),
            embed: Some(false),
            attach: Some(false),
            ..Self::default()
        }
    }

    /// Read-only restriction for quarantined members in protected channels.
    pub fn deny_quarantined() -> Self {
        Self {
            send: Some(false),
            react: Some(false),
            attach: Some(false),
            embed: Some(false),
            ..Self::default()
        }
    }

    /// Explicit posting grant for automation in bot-allowed channels.
    pub fn allow_automation() -> Self {
        Self {
            send: Some(true),
            embed: Some(true),
            attach: Some(true),
            ..Self::default()
        }
    }

    /// Hide the channel entirely.
    pub fn hide() -> Self {
        Self {
            view: Some(false),
            ..Self::default()
        }
    }

    /// Visibility plus posting, for the quarantine holding channel.
    pub fn view_and_send() -> Self {
        Self {
            view: Some(true),
            send: Some(true),
            ..Self::default()
        }
    }

    /// Channel lockdown: everyone loses send.
    pub fn deny_send() -> Self {
        Self {
            send: Some(false),
            ..Self::default()
        }
    }
}

// ============================================================================
// Gateway trait
// ============================================================================

/// Remote platform operations used by provisioning passes and event handling.
///
/// Implementations are expected to perform exactly one remote call per method
/// and to surface platform failures through [`GatewayError`]; no method
/// retries internally.
#[async_trait]
pub trait Gateway: Send + Sync {
    // --- Read interface (Directory snapshot source) ---

    async fn list_roles(&self) -> GatewayResult<Vec<RemoteRole>>;
    async fn list_categories(&self) -> GatewayResult<Vec<RemoteCategory>>;
    async fn list_channels(&self) -> GatewayResult<Vec<RemoteChannel>>;
    async fn list_members(&self) -> GatewayResult<Vec<RemoteMember>>;

    // --- Mutation interface ---

    async fn create_role(&self, spec: &RoleSpec) -> GatewayResult<RoleId>;
    async fn create_category(&self, name: &str) -> GatewayResult<CategoryId>;
    async fn create_channel(
        &self,
        name: &str,
        category: CategoryId,
        topic: &str,
    ) -> GatewayResult<ChannelId>;

    /// Replace the override tuple for (channel, target).
    async fn set_permission_override(
        &self,
        channel: ChannelId,
        target: OverrideTarget,
        flags: PermissionFlags,
    ) -> GatewayResult<()>;

    /// Set the per-member slow-mode delay on a channel, in seconds.
    async fn edit_slow_mode(&self, channel: ChannelId, seconds: u32) -> GatewayResult<()>;

    async fn add_role(&self, member: MemberId, role: RoleId) -> GatewayResult<()>;
    async fn remove_role(&self, member: MemberId, role: RoleId) -> GatewayResult<()>;

    async fn delete_message(&self, message: MessageId) -> GatewayResult<()>;

    /// Post a notice to a channel, optionally auto-expiring after a delay.
    async fn send_notice(
        &self,
        channel: ChannelId,
        text: &str,
        auto_expire_secs: Option<u32>,
    ) -> GatewayResult<()>;

    /// Create an integration endpoint scoped to a channel and return its
    /// secret URL. The URL must never reach a broadcast destination.
    async fn create_integration_endpoint(
        &self,
        channel: ChannelId,
        name: &str,
    ) -> GatewayResult<String>;
}

// ============================================================================
// Recording gateway (dry-run planner + tests)
// ============================================================================

/// One mutation as recorded by [`RecordingGateway`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    CreateRole { name: String },
    CreateCategory { name: String },
    CreateChannel { name: String, category: CategoryId, topic: String },
    SetOverride { channel: ChannelId, target: OverrideTarget, flags: PermissionFlags },
    EditSlowMode { channel: ChannelId, seconds: u32 },
    AddRole { member: MemberId, role: RoleId },
    RemoveRole { member: MemberId, role: RoleId },
    DeleteMessage { message: MessageId },
    SendNotice { channel: ChannelId, text: String, auto_expire_secs: Option<u32> },
    CreateEndpoint { channel: ChannelId, name: String },
}

#[derive(Default)]
struct RecordingState {
    roles: Vec<RemoteRole>,
    categories: Vec<RemoteCategory>,
    channels: Vec<RemoteChannel>,
    members: Vec<RemoteMember>,
    calls: Vec<RecordedCall>,
    /// Channel names whose creation should fail with a transient error.
    fail_channels: HashSet<String>,
    /// Fail all endpoint creations with an unauthorized error.
    fail_endpoints: bool,
}

/// In-memory [`Gateway`] that applies mutations to its own entity tables.
///
/// Serves two roles: the dry-run planner's target (an empty space that the
/// pass converges) and the test double (inspect [`calls`](Self::calls),
/// inject failures, pre-seed members).
#[derive(Default)]
pub struct RecordingGateway {
    state: Mutex<RecordingState>,
    next_id: AtomicU64,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Ordered log of every mutation applied so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().calls.clone()
    }

    /// Number of mutations applied so far.
    pub fn mutation_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Make `create_channel` for this name fail with a transient error.
    pub fn fail_channel_named(&self, name: &str) {
        self.state.lock().fail_channels.insert(name.to_string());
    }

    /// Make every `create_integration_endpoint` fail as unauthorized.
    pub fn fail_endpoints(&self) {
        self.state.lock().fail_endpoints = true;
    }

    /// Clear all injected failures (the transient condition resolves).
    pub fn clear_failures(&self) {
        let mut state = self.state.lock();
        state.fail_channels.clear();
        state.fail_endpoints = false;
    }

    /// Pre-seed a member, returning its id.
    pub fn seed_member(&self, name: &str, account_created: DateTime<Utc>) -> MemberId {
        let id = MemberId(self.fresh_id());
        self.state.lock().members.push(RemoteMember {
            id,
            name: name.to_string(),
            roles: Vec::new(),
            account_created,
        });
        id
    }

    /// Roles currently held by a member.
    pub fn member_roles(&self, member: MemberId) -> Vec<RoleId> {
        self.state
            .lock()
            .members
            .iter()
            .find(|m| m.id == member)
            .map(|m| m.roles.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Gateway for RecordingGateway {
    async fn list_roles(&self) -> GatewayResult<Vec<RemoteRole>> {
        Ok(self.state.lock().roles.clone())
    }

    async fn list_categories(&self) -> GatewayResult<Vec<RemoteCategory>> {
        Ok(self.state.lock().categories.clone())
    }

    async fn list_channels(&self) -> GatewayResult<Vec<RemoteChannel>> {
        Ok(self.state.lock().channels.clone())
    }

    async fn list_members(&self) -> GatewayResult<Vec<RemoteMember>> {
        Ok(self.state.lock().members.clone())
    }

    async fn create_role(&self, spec: &RoleSpec) -> GatewayResult<RoleId> {
        let id = RoleId(self.fresh_id());
        let mut state = self.state.lock();
        state.roles.push(RemoteRole {
            id,
            name: spec.name.clone(),
        });
        state.calls.push(RecordedCall::CreateRole {
            name: spec.name.clone(),
        });
        Ok(id)
    }

    async fn create_category(&self, name: &str) -> GatewayResult<CategoryId> {
        let id = CategoryId(self.fresh_id());
        let mut state = self.state.lock();
        state.categories.push(RemoteCategory {
            id,
            name: name.to_string(),
        });
        state.calls.push(RecordedCall::CreateCategory {
            name: name.to_string(),
        });
        Ok(id)
    }

    async fn create_channel(
        &self,
        name: &str,
        category: CategoryId,
        topic: &str,
    ) -> GatewayResult<ChannelId> {
        let id = ChannelId(self.fresh_id());
        let mut state = self.state.lock();
        if state.fail_channels.contains(name) {
            return Err(GatewayError::Transient(format!(
                "injected failure creating #{name}"
            )));
        }
        state.channels.push(RemoteChannel {
            id,
            name: name.to_string(),
            category: Some(category),
        });
        state.calls.push(RecordedCall::CreateChannel {
            name: name.to_string(),
            category,
            topic: topic.to_string(),
        });
        Ok(id)
    }

    async fn set_permission_override(
        &self,
        channel: ChannelId,
        target: OverrideTarget,
        flags: PermissionFlags,
    ) -> GatewayResult<()> {
        self.state.lock().calls.push(RecordedCall::SetOverride {
            channel,
            target,
            flags,
        });
        Ok(())
    }

    async fn edit_slow_mode(&self, channel: ChannelId, seconds: u32) -> GatewayResult<()> {
        self.state
            .lock()
            .calls
            .push(RecordedCall::EditSlowMode { channel, seconds });
        Ok(())
    }

    async fn add_role(&self, member: MemberId, role: RoleId) -> GatewayResult<()> {
        let mut state = self.state.lock();
        let Some(entry) = state.members.iter_mut().find(|m| m.id == member) else {
            return Err(GatewayError::NotFound(format!("member {member}")));
        };
        if !entry.roles.contains(&role) {
            entry.roles.push(role);
        }
        state.calls.push(RecordedCall::AddRole { member, role });
        Ok(())
    }

    async fn remove_role(&self, member: MemberId, role: RoleId) -> GatewayResult<()> {
        let mut state = self.state.lock();
        let Some(entry) = state.members.iter_mut().find(|m| m.id == member) else {
            return Err(GatewayError::NotFound(format!("member {member}")));
        };
        entry.roles.retain(|r| *r != role);
        state.calls.push(RecordedCall::RemoveRole { member, role });
        Ok(())
    }

    async fn delete_message(&self, message: MessageId) -> GatewayResult<()> {
        self.state
            .lock()
            .calls
            .push(RecordedCall::DeleteMessage { message });
        Ok(())
    }

    async fn send_notice(
        &self,
        channel: ChannelId,
        text: &str,
        auto_expire_secs: Option<u32>,
    ) -> GatewayResult<()> {
        self.state.lock().calls.push(RecordedCall::SendNotice {
            channel,
            text: text.to_string(),
            auto_expire_secs,
        });
        Ok(())
    }

    async fn create_integration_endpoint(
        &self,
        channel: ChannelId,
        name: &str,
    ) -> GatewayResult<String> {
        let id = self.fresh_id();
        let mut state = self.state.lock();
        if state.fail_endpoints {
            return Err(GatewayError::Unauthorized(
                "missing manage-webhooks permission".to_string(),
            ));
        }
        state.calls.push(RecordedCall::CreateEndpoint {
            channel,
            name: name.to_string(),
        });
        Ok(format!(
            "https://hooks.example.invalid/{channel}/{id}-secret"
        ))
    }
}
