//! Trial subscription types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// Trial subscription record, one per user
///
/// Created at signup with a short default window; extended only by the
/// referral unlock path or superseded by a pro purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialRecord {
    /// User who owns the trial
    pub user_id: UserId,
    /// Whether the trial has been activated
    pub is_trial_active: bool,
    /// When the trial ends; absent means already expired (fail safe)
    pub trial_end_date: Option<DateTime<Utc>>,
    /// Cached day count shown in the UI; derived, never authoritative
    pub trial_days_remaining: i32,
    /// Whether a referral unlock is currently suppressing lockout
    pub trial_unlocked_by_referral: bool,
    /// Whether the user bought the full product
    pub pro_purchased: bool,
    /// When the referral unlock was granted, if ever
    pub referral_unlock_date: Option<DateTime<Utc>>,
    /// When the trial record was created
    pub created_at: DateTime<Utc>,
}

/// Access state derived from a trial record at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialAccess {
    /// Full product purchased; never locked out
    Pro,
    /// Lockout suppressed by a referral unlock
    Unlocked,
    /// Trial window still open
    Active,
    /// Trial elapsed and no unlock condition holds
    LockedOut,
}

impl TrialAccess {
    /// Whether this state grants access to trial-gated features
    pub const fn is_allowed(&self) -> bool {
        !matches!(self, Self::LockedOut)
    }
}

impl std::fmt::Display for TrialAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pro => write!(f, "pro"),
            Self::Unlocked => write!(f, "unlocked"),
            Self::Active => write!(f, "active"),
            Self::LockedOut => write!(f, "locked_out"),
        }
    }
}
