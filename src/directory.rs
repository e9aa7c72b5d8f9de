//! Read-only view of current remote state.
//!
//! A [`Directory`] is one snapshot of the entities that exist on the remote
//! platform, fetched at the start of a provisioning pass. Every "does X
//! already exist" decision goes through it; nothing is cached across passes,
//! so a fresh snapshot per pass avoids stale reads.
//!
//! Lookup is by exact display name. That is a stand-in for true identity
//! (a rename outside this system orphans the old entity), kept behind this
//! interface so an identity-keyed lookup could replace it without touching
//! the reconciler.

use crate::error::GatewayResult;
use crate::gateway::{
    CategoryId, ChannelId, Gateway, MemberId, RemoteCategory, RemoteChannel, RemoteMember,
    RemoteRole, RoleId,
};

/// Snapshot of remote roles, categories, channels, and members.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    roles: Vec<RemoteRole>,
    categories: Vec<RemoteCategory>,
    channels: Vec<RemoteChannel>,
    members: Vec<RemoteMember>,
}

impl Directory {
    /// Fetch a fresh snapshot from the gateway.
    pub async fn fetch(gateway: &dyn Gateway) -> GatewayResult<Self> {
        Ok(Self {
            roles: gateway.list_roles().await?,
            categories: gateway.list_categories().await?,
            channels: gateway.list_channels().await?,
            members: gateway.list_members().await?,
        })
    }

    /// Build a snapshot from already-listed entities (tests, planners).
    pub fn from_parts(
        roles: Vec<RemoteRole>,
        categories: Vec<RemoteCategory>,
        channels: Vec<RemoteChannel>,
        members: Vec<RemoteMember>,
    ) -> Self {
        Self {
            roles,
            categories,
            channels,
            members,
        }
    }

    // --- Exact-name lookups ---

    pub fn find_role(&self, name: &str) -> Option<&RemoteRole> {
        self.roles.iter().find(|r| r.name == name)
    }

    pub fn find_category(&self, name: &str) -> Option<&RemoteCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Channel lookup is global, not scoped to category; the topology keeps
    /// channel names unique so this ambiguity is harmless in practice.
    pub fn find_channel(&self, name: &str) -> Option<&RemoteChannel> {
        self.channels.iter().find(|c| c.name == name)
    }

    pub fn member(&self, id: MemberId) -> Option<&RemoteMember> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Case-insensitive member lookup by display name. Pure: returns the
    /// identity, mutates nothing.
    pub fn find_member_named(&self, name: &str) -> Option<&RemoteMember> {
        self.members
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    // --- Aggregates ---

    pub fn roles(&self) -> &[RemoteRole] {
        &self.roles
    }

    pub fn channels(&self) -> &[RemoteChannel] {
        &self.channels
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Members currently holding the given role.
    pub fn members_with_role(&self, role: RoleId) -> usize {
        self.members
            .iter()
            .filter(|m| m.roles.contains(&role))
            .count()
    }

    // --- In-pass updates ---
    //
    // A provisioning pass records what it creates so later steps in the same
    // pass can resolve those entities without a re-fetch.

    pub fn record_role(&mut self, id: RoleId, name: &str) {
        self.roles.push(RemoteRole {
            id,
            name: name.to_string(),
        });
    }

    pub fn record_category(&mut self, id: CategoryId, name: &str) {
        self.categories.push(RemoteCategory {
            id,
            name: name.to_string(),
        });
    }

    pub fn record_channel(&mut self, id: ChannelId, name: &str, category: CategoryId) {
        self.channels.push(RemoteChannel {
            id,
            name: name.to_string(),
            category: Some(category),
        });
    }
}
