//! Property-based tests for trial evaluation
//!
//! These verify the contract of the pure evaluator:
//! - days remaining never goes negative and never increases as time passes
//! - pro purchase and referral unlock suppress lockout unconditionally
//! - a missing end date fails safe (locked out unless pro)

use chrono::{DateTime, Duration, TimeZone, Utc};
use nutriq_trial_core::{access, days_remaining, is_expired, is_locked_out};
use nutriq_types::{TrialAccess, TrialRecord, UserId};
use proptest::prelude::*;

/// A fixed reference instant so generated offsets stay in range
fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn record(end_offset_hours: Option<i64>, unlocked: bool, pro: bool) -> TrialRecord {
    let now = base();
    TrialRecord {
        user_id: UserId::new(),
        is_trial_active: true,
        trial_end_date: end_offset_hours.map(|h| now + Duration::hours(h)),
        trial_days_remaining: 0,
        trial_unlocked_by_referral: unlocked,
        pro_purchased: pro,
        referral_unlock_date: None,
        created_at: now,
    }
}

proptest! {
    /// Property: days remaining is never negative
    #[test]
    fn prop_days_remaining_never_negative(offset_hours in -10_000i64..10_000) {
        let now = base();
        let end = now + Duration::hours(offset_hours);
        prop_assert!(days_remaining(Some(end), now) >= 0);
    }

    /// Property: days remaining is monotonically non-increasing as now advances
    #[test]
    fn prop_days_remaining_monotone(
        end_offset_hours in 0i64..5_000,
        step_minutes in 0i64..100_000,
    ) {
        let now = base();
        let end = now + Duration::hours(end_offset_hours);
        let later = now + Duration::minutes(step_minutes);

        let before = days_remaining(Some(end), now);
        let after = days_remaining(Some(end), later);
        prop_assert!(after <= before, "{after} > {before}");
    }

    /// Property: a future end date always leaves at least one day
    #[test]
    fn prop_future_end_date_is_not_expired(offset_minutes in 1i64..1_000_000) {
        let now = base();
        let end = now + Duration::minutes(offset_minutes);
        prop_assert!(days_remaining(Some(end), now) >= 1);
        prop_assert!(!is_expired(Some(end), now));
    }

    /// Property: pro purchase suppresses lockout regardless of the end date
    #[test]
    fn prop_pro_never_locked_out(
        end_offset_hours in proptest::option::of(-10_000i64..10_000),
        unlocked in any::<bool>(),
    ) {
        let trial = record(end_offset_hours, unlocked, true);
        prop_assert!(!is_locked_out(&trial, base()));
        prop_assert_eq!(access(&trial, base()), TrialAccess::Pro);
    }

    /// Property: referral unlock suppresses lockout even past the end date
    #[test]
    fn prop_unlocked_never_locked_out(end_offset_hours in proptest::option::of(-10_000i64..10_000)) {
        let trial = record(end_offset_hours, true, false);
        prop_assert!(!is_locked_out(&trial, base()));
        prop_assert_eq!(access(&trial, base()), TrialAccess::Unlocked);
    }

    /// Property: without an unlock condition, lockout tracks expiry exactly
    #[test]
    fn prop_lockout_tracks_expiry(end_offset_hours in -10_000i64..10_000) {
        let trial = record(Some(end_offset_hours), false, false);
        let now = base();
        prop_assert_eq!(is_locked_out(&trial, now), is_expired(trial.trial_end_date, now));
    }

    /// Property: access and lockout never disagree
    #[test]
    fn prop_access_consistent_with_lockout(
        end_offset_hours in proptest::option::of(-10_000i64..10_000),
        unlocked in any::<bool>(),
        pro in any::<bool>(),
    ) {
        let trial = record(end_offset_hours, unlocked, pro);
        let now = base();
        prop_assert_eq!(
            access(&trial, now) == TrialAccess::LockedOut,
            is_locked_out(&trial, now)
        );
    }
}

#[test]
fn test_missing_end_date_locked_out_unless_pro() {
    let now = base();

    let trial = record(None, false, false);
    assert!(is_locked_out(&trial, now));

    let trial = record(None, false, true);
    assert!(!is_locked_out(&trial, now));
}

#[test]
fn test_example_expired_yesterday() {
    // trial_end_date = now - 1 day, no pro, no unlock => locked out
    let now = base();
    let trial = record(Some(-24), false, false);
    assert!(is_locked_out(&trial, now));
    assert_eq!(days_remaining(trial.trial_end_date, now), 0);
}
