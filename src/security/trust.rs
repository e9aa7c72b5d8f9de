//! Member trust state machine.
//!
//! ```text
//! ┌───────┐  join, age < 1 day   ┌─────────────┐  unquarantine   ┌──────────┐
//! │  New  ├─────────────────────►│ Quarantined ├────────────────►│ Verified │
//! └───┬───┘                      └─────────────┘                 └──────────┘
//!     │                                ▲                              ▲
//!     │        manual quarantine       │       manual verify          │
//!     └────────────────────────────────┴──────────────────────────────┘
//! ```
//!
//! There is no automatic decay and no automatic promotion out of
//! `Quarantined`: release requires an explicit moderator action. False
//! positives get human remediation; account-age spoofing is out of scope.
//!
//! Transition decisions are synchronous and never suspend. Role mutations
//! implied by a transition (add/remove quarantine and verified roles) are
//! applied by the caller from the returned outcome, so the machine itself is
//! testable without a gateway.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::gateway::MemberId;

/// Account age below which a joining member is quarantined, in days.
const QUARANTINE_AGE_DAYS: i64 = 1;

/// Account age below which a joining member is flagged for watching, in days.
const WATCH_AGE_DAYS: i64 = 7;

/// A member's position in the trust lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrustState {
    /// Initial, implicit state; members never observed also read as `New`.
    #[default]
    New,
    Quarantined,
    Verified,
}

/// Per-member trust record, created implicitly on first join observation.
#[derive(Debug, Clone, Copy)]
struct TrustRecord {
    state: TrustState,
    /// Account age at the most recent join evaluation, in days.
    account_age_days: i64,
}

/// Result of screening a joining member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinScreening {
    /// Account younger than one day: quarantine role must be applied.
    Quarantine { account_age_days: i64 },
    /// Account younger than a week: no role change, low-confidence warning.
    Watch { account_age_days: i64 },
    /// Nothing suspicious.
    Clear,
}

/// Result of a manual quarantine command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarantineOutcome {
    /// State moved to `Quarantined`; quarantine role must be applied.
    Applied,
    /// Already quarantined; the reason was re-logged, nothing else changed.
    AlreadyQuarantined,
}

/// Result of a manual unquarantine command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// `Quarantined` → `Verified`; swap quarantine role for verified role.
    Released,
    /// Member was not quarantined; state unchanged.
    NotQuarantined,
}

/// Result of a manual verify command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// State moved to `Verified`; verified role must be applied.
    Verified,
    /// Already verified; nothing changed.
    AlreadyVerified,
}

/// Per-member trust state machine.
///
/// For a single member, transitions are applied in event-arrival order (the
/// event loop handles one event to completion at a time); across members no
/// ordering is guaranteed or required.
#[derive(Default)]
pub struct TrustEngine {
    records: DashMap<MemberId, TrustRecord>,
}

impl TrustEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Screen a joining member by account age.
    ///
    /// Creates the member's record implicitly. Re-joins re-evaluate age but a
    /// previously verified member is not demoted by joining again.
    pub fn screen_join(
        &self,
        member: MemberId,
        account_created: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> JoinScreening {
        let account_age_days = (now - account_created).num_days();
        let mut entry = self.records.entry(member).or_insert(TrustRecord {
            state: TrustState::New,
            account_age_days,
        });
        entry.account_age_days = account_age_days;

        if entry.state == TrustState::Verified {
            debug!(member = %member, "verified member rejoined, skipping screening");
            return JoinScreening::Clear;
        }

        if account_age_days < QUARANTINE_AGE_DAYS {
            entry.state = TrustState::Quarantined;
            warn!(
                member = %member,
                account_age_days,
                "very new account, quarantining on join"
            );
            JoinScreening::Quarantine { account_age_days }
        } else if account_age_days < WATCH_AGE_DAYS {
            warn!(
                member = %member,
                account_age_days,
                "new account detected, watching"
            );
            JoinScreening::Watch { account_age_days }
        } else {
            JoinScreening::Clear
        }
    }

    fn record_entry(
        &self,
        member: MemberId,
    ) -> dashmap::mapref::one::RefMut<'_, MemberId, TrustRecord> {
        self.records.entry(member).or_insert(TrustRecord {
            state: TrustState::New,
            account_age_days: 0,
        })
    }

    /// Manual quarantine: any state → `Quarantined`. Idempotent beyond
    /// re-logging the reason.
    pub fn quarantine(&self, member: MemberId, reason: &str) -> QuarantineOutcome {
        let mut entry = self.record_entry(member);
        info!(member = %member, reason = %reason, "quarantine requested");
        if entry.state == TrustState::Quarantined {
            return QuarantineOutcome::AlreadyQuarantined;
        }
        entry.state = TrustState::Quarantined;
        QuarantineOutcome::Applied
    }

    /// Manual release: `Quarantined` → `Verified` only. Any other state is
    /// reported without mutation.
    pub fn unquarantine(&self, member: MemberId) -> ReleaseOutcome {
        let mut entry = self.record_entry(member);
        if entry.state != TrustState::Quarantined {
            return ReleaseOutcome::NotQuarantined;
        }
        entry.state = TrustState::Verified;
        info!(member = %member, "released from quarantine, now verified");
        ReleaseOutcome::Released
    }

    /// Manual verification: any state → `Verified` directly, bypassing
    /// quarantine. Idempotent.
    pub fn verify(&self, member: MemberId) -> VerifyOutcome {
        let mut entry = self.record_entry(member);
        if entry.state == TrustState::Verified {
            return VerifyOutcome::AlreadyVerified;
        }
        entry.state = TrustState::Verified;
        info!(member = %member, "manually verified");
        VerifyOutcome::Verified
    }

    /// Current trust state; members never observed read as `New`.
    pub fn state(&self, member: MemberId) -> TrustState {
        self.records
            .get(&member)
            .map(|r| r.state)
            .unwrap_or_default()
    }

    /// Number of members currently quarantined.
    pub fn quarantined_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.state == TrustState::Quarantined)
            .count()
    }
}
