//! Trial evaluation
//!
//! Pure functions from a trial record and an instant to an access verdict.
//! No I/O, no caching: "now" changes, so every read re-evaluates.

use chrono::{DateTime, Utc};

use nutriq_types::{TrialAccess, TrialRecord};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Whole days remaining until the trial ends
///
/// Rounds partial days up and clamps at zero; a missing end date counts as
/// zero (fail safe).
pub fn days_remaining(trial_end_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    let Some(end) = trial_end_date else {
        return 0;
    };

    let millis = end.signed_duration_since(now).num_milliseconds();
    if millis <= 0 {
        return 0;
    }

    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

/// Whether the trial window has elapsed
pub fn is_expired(trial_end_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    days_remaining(trial_end_date, now) == 0
}

/// Whether trial benefits are withheld
///
/// A pro purchase or a referral unlock suppresses lockout unconditionally;
/// otherwise lockout follows expiry. A record with no end date is treated
/// as expired.
pub fn is_locked_out(trial: &TrialRecord, now: DateTime<Utc>) -> bool {
    if trial.pro_purchased {
        return false;
    }
    if trial.trial_unlocked_by_referral {
        return false;
    }
    is_expired(trial.trial_end_date, now)
}

/// Collapse a trial record into the access state shown to the user
pub fn access(trial: &TrialRecord, now: DateTime<Utc>) -> TrialAccess {
    if trial.pro_purchased {
        TrialAccess::Pro
    } else if trial.trial_unlocked_by_referral {
        TrialAccess::Unlocked
    } else if is_expired(trial.trial_end_date, now) {
        TrialAccess::LockedOut
    } else {
        TrialAccess::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use nutriq_types::UserId;

    fn record(
        end: Option<DateTime<Utc>>,
        unlocked: bool,
        pro: bool,
        now: DateTime<Utc>,
    ) -> TrialRecord {
        TrialRecord {
            user_id: UserId::new(),
            is_trial_active: true,
            trial_end_date: end,
            trial_days_remaining: 0,
            trial_unlocked_by_referral: unlocked,
            pro_purchased: pro,
            referral_unlock_date: None,
            created_at: now,
        }
    }

    #[test]
    fn test_days_remaining_rounds_up() {
        let now = Utc::now();
        // Half a day left still shows as one day
        assert_eq!(days_remaining(Some(now + Duration::hours(12)), now), 1);
        assert_eq!(days_remaining(Some(now + Duration::days(3)), now), 3);
        // A few minutes past three days rounds to four
        assert_eq!(
            days_remaining(Some(now + Duration::days(3) + Duration::minutes(5)), now),
            4
        );
    }

    #[test]
    fn test_days_remaining_clamped_at_zero() {
        let now = Utc::now();
        assert_eq!(days_remaining(Some(now - Duration::days(1)), now), 0);
        assert_eq!(days_remaining(Some(now), now), 0);
        assert_eq!(days_remaining(None, now), 0);
    }

    #[test]
    fn test_expired_trial_locks_out() {
        let now = Utc::now();
        let trial = record(Some(now - Duration::days(1)), false, false, now);
        assert!(is_locked_out(&trial, now));
        assert_eq!(access(&trial, now), TrialAccess::LockedOut);
    }

    #[test]
    fn test_active_trial_not_locked_out() {
        let now = Utc::now();
        let trial = record(Some(now + Duration::days(2)), false, false, now);
        assert!(!is_locked_out(&trial, now));
        assert_eq!(access(&trial, now), TrialAccess::Active);
        assert!(access(&trial, now).is_allowed());
    }

    #[test]
    fn test_pro_purchase_suppresses_lockout() {
        let now = Utc::now();
        let trial = record(Some(now - Duration::days(100)), false, true, now);
        assert!(!is_locked_out(&trial, now));
        assert_eq!(access(&trial, now), TrialAccess::Pro);

        // Even with no end date at all
        let trial = record(None, false, true, now);
        assert!(!is_locked_out(&trial, now));
    }

    #[test]
    fn test_referral_unlock_suppresses_lockout() {
        let now = Utc::now();
        let trial = record(Some(now - Duration::days(1)), true, false, now);
        assert!(!is_locked_out(&trial, now));
        assert_eq!(access(&trial, now), TrialAccess::Unlocked);
    }

    #[test]
    fn test_missing_end_date_fails_safe() {
        let now = Utc::now();
        let trial = record(None, false, false, now);
        assert!(is_expired(trial.trial_end_date, now));
        assert!(is_locked_out(&trial, now));
    }
}
