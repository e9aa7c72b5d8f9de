//! Message risk scoring.
//!
//! [`score`] is a total, side-effect-free function of (text, config): same
//! inputs always produce the same verdict, and unrecognized content defaults
//! to [`Verdict::Allow`]. All remediation (delete, notice) is applied by the
//! caller, which keeps every rule unit-testable without a live transport.
//!
//! Rules are evaluated first-match-wins, caps before links; on one message
//! only the first triggered rule's action is taken.

use crate::config::AutoModConfig;

/// Minimum message length (in chars) before the caps rule applies.
const CAPS_MIN_LENGTH: usize = 10;

/// Notice lifetime for a caps warning, seconds.
const CAPS_NOTICE_EXPIRE_SECS: u32 = 10;

/// Notice lifetime for a blocked link, seconds.
const LINK_NOTICE_EXPIRE_SECS: u32 = 15;

/// URL-shortener domains treated as suspicious. Matched case-insensitively as
/// substrings of the message text.
const URL_SHORTENERS: [&str; 8] = [
    "bit.ly",
    "tinyurl.com",
    "goo.gl",
    "t.co",
    "ow.ly",
    "short.link",
    "cutt.ly",
    "tiny.cc",
];

/// Remediation decision for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// No rule triggered; no side effect.
    Allow,
    /// Delete the message and post a short-lived warning notice.
    WarnAndDelete {
        reason: String,
        notice: String,
        notice_expire_secs: u32,
    },
    /// Delete the message and post a longer-lived blocking notice.
    BlockAndDelete {
        reason: String,
        notice: String,
        notice_expire_secs: u32,
    },
}

impl Verdict {
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Score one message against the configured heuristics.
pub fn score(text: &str, automod: &AutoModConfig) -> Verdict {
    if !automod.enabled {
        return Verdict::Allow;
    }

    if automod.block_excessive_caps && let Some(verdict) = check_excessive_caps(text) {
        return verdict;
    }

    if automod.block_suspicious_links && let Some(verdict) = check_suspicious_links(text) {
        return verdict;
    }

    Verdict::Allow
}

/// Excessive-caps rule: strictly more than 70% of chars uppercase, applied
/// only to messages longer than [`CAPS_MIN_LENGTH`] chars.
///
/// Integer comparison (`caps * 10 > len * 7`) keeps the exact 70% boundary
/// out of float territory: a message at exactly 70% must not trigger.
fn check_excessive_caps(text: &str) -> Option<Verdict> {
    let length = text.chars().count();
    if length <= CAPS_MIN_LENGTH {
        return None;
    }
    let caps = text.chars().filter(|c| c.is_uppercase()).count();
    if caps * 10 > length * 7 {
        return Some(Verdict::WarnAndDelete {
            reason: format!("excessive caps ({caps}/{length} uppercase)"),
            notice: "please don't use excessive caps.".to_string(),
            notice_expire_secs: CAPS_NOTICE_EXPIRE_SECS,
        });
    }
    None
}

/// Suspicious-link rule: case-insensitive substring match against the
/// shortener deny-list.
fn check_suspicious_links(text: &str) -> Option<Verdict> {
    let lowered = text.to_lowercase();
    let domain = URL_SHORTENERS.iter().find(|d| lowered.contains(*d))?;
    Some(Verdict::BlockAndDelete {
        reason: format!("suspicious link ({domain})"),
        notice: "suspicious links are not allowed. Please use direct links.".to_string(),
        notice_expire_secs: LINK_NOTICE_EXPIRE_SECS,
    })
}
