//! Security module for wardend.
//!
//! Two engines, both synchronous decision logic with side effects applied by
//! the caller:
//! - **Trust**: per-member state machine (new → quarantined → verified)
//!   driven by account-age signals at join time and by moderator commands
//! - **Risk**: pure per-message verdict function (caps ratio, suspicious
//!   links) with first-match-wins rule ordering

pub mod risk;
pub mod trust;

pub use risk::{Verdict, score};
pub use trust::{
    JoinScreening, QuarantineOutcome, ReleaseOutcome, TrustEngine, TrustState, VerifyOutcome,
};
