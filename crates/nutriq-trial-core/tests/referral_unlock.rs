//! Referral application, verification, and unlock behavior

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use nutriq_db::TrialRepository;
use nutriq_trial_core::{
    days_remaining, DeviceInfo, TrialError, TrialService, REFERRALS_REQUIRED,
    REFERRAL_UNLOCK_DAYS,
};
use nutriq_types::{TrialAccess, UserId};

use common::mock_repos::{MockDeviceRepository, MockReferralRepository, MockTrialRepository};

type Service = TrialService<MockTrialRepository, MockReferralRepository, MockDeviceRepository>;

fn service() -> (Service, MockTrialRepository, MockDeviceRepository) {
    let trials = MockTrialRepository::new();
    let devices = MockDeviceRepository::new();
    let svc = TrialService::new(
        Arc::new(trials.clone()),
        Arc::new(MockReferralRepository::new()),
        Arc::new(devices.clone()),
    );
    (svc, trials, devices)
}

fn device(ip: &str) -> DeviceInfo {
    DeviceInfo {
        device_id: "fp-abc123".to_string(),
        ip_address: ip.to_string(),
        user_agent: Some("test-agent".to_string()),
    }
}

#[tokio::test]
async fn test_third_verified_referral_unlocks_referrer_exactly_once() {
    let (svc, trials, _) = service();
    let now = Utc::now();

    // Referrer A signs up and gets a code.
    let a = UserId::new();
    let grant = svc.start_trial(a, device("10.0.0.1"), now).await.unwrap();
    let code = grant.referral_code;

    // B, C, D sign up with A's code and confirm their accounts.
    for i in 0..REFERRALS_REQUIRED {
        let referred = UserId::new();
        svc.apply_referral(
            referred,
            Some(format!("friend{i}@example.com")),
            &code,
            now,
        )
        .await
        .unwrap();

        let outcome = svc.confirm_referral(referred, now).await.unwrap();
        assert!(outcome.verified_now);
        if i < REFERRALS_REQUIRED - 1 {
            assert!(outcome.unlock.is_none(), "no unlock before the threshold");
        } else {
            let unlock = outcome.unlock.expect("third verification unlocks");
            assert_eq!(unlock.referrer_id, a);
        }
    }

    let trial = trials.find_by_user_id(a.0).await.unwrap().unwrap();
    assert!(trial.trial_unlocked_by_referral);
    assert_eq!(trial.trial_days_remaining, REFERRAL_UNLOCK_DAYS as i32);
    assert!(trial.referral_unlock_date.is_some());
    assert_eq!(days_remaining(trial.trial_end_date, now), REFERRAL_UNLOCK_DAYS);
}

#[tokio::test]
async fn test_fourth_referral_does_not_extend_again() {
    let (svc, trials, _) = service();
    let now = Utc::now();

    let a = UserId::new();
    let code = svc
        .start_trial(a, device("10.0.0.1"), now)
        .await
        .unwrap()
        .referral_code;

    for _ in 0..REFERRALS_REQUIRED {
        let referred = UserId::new();
        svc.apply_referral(referred, None, &code, now).await.unwrap();
        svc.confirm_referral(referred, now).await.unwrap();
    }

    let end_after_unlock = trials
        .find_by_user_id(a.0)
        .await
        .unwrap()
        .unwrap()
        .trial_end_date;

    // A fourth verified referral arrives later.
    let later = now + Duration::days(5);
    let referred = UserId::new();
    svc.apply_referral(referred, None, &code, later).await.unwrap();
    let outcome = svc.confirm_referral(referred, later).await.unwrap();

    assert!(outcome.verified_now);
    assert!(outcome.unlock.is_none(), "re-trigger past the threshold is a no-op");
    let trial = trials.find_by_user_id(a.0).await.unwrap().unwrap();
    assert_eq!(trial.trial_end_date, end_after_unlock);
}

#[tokio::test]
async fn test_unverified_edges_do_not_count() {
    let (svc, trials, _) = service();
    let now = Utc::now();

    let a = UserId::new();
    let code = svc
        .start_trial(a, device("10.0.0.1"), now)
        .await
        .unwrap()
        .referral_code;

    // Three signups, none confirmed.
    for _ in 0..REFERRALS_REQUIRED {
        let referred = UserId::new();
        svc.apply_referral(referred, None, &code, now).await.unwrap();
    }

    let trial = trials.find_by_user_id(a.0).await.unwrap().unwrap();
    assert!(!trial.trial_unlocked_by_referral);

    let summary = svc.referral_summary(a).await.unwrap();
    assert_eq!(summary.verified, 0);
    assert_eq!(summary.pending, REFERRALS_REQUIRED);
}

#[tokio::test]
async fn test_duplicate_referral_rejected_leaving_one_edge() {
    let (svc, _, _) = service();
    let now = Utc::now();

    let a = UserId::new();
    let code = svc
        .start_trial(a, device("10.0.0.1"), now)
        .await
        .unwrap()
        .referral_code;

    let b = UserId::new();
    let applied = svc.apply_referral(b, None, &code, now).await.unwrap();
    assert_eq!(applied.referral.referrer_id, a);
    assert_eq!(applied.referral.referred_user_id, b);
    assert!(!applied.referral.is_verified);

    // Double-submit of the same signup form.
    let result = svc.apply_referral(b, None, &code, now).await;
    assert!(matches!(result, Err(TrialError::DuplicateReferral)));

    let summary = svc.referral_summary(a).await.unwrap();
    assert_eq!(summary.referrals.len(), 1);
}

#[tokio::test]
async fn test_unknown_code_fails_with_code_not_found() {
    let (svc, _, _) = service();
    let now = Utc::now();

    let result = svc
        .apply_referral(UserId::new(), None, "NOSUCHCD", now)
        .await;
    assert!(matches!(result, Err(TrialError::CodeNotFound)));
}

#[tokio::test]
async fn test_self_referral_rejected() {
    let (svc, _, _) = service();
    let now = Utc::now();

    let a = UserId::new();
    let code = svc
        .start_trial(a, device("10.0.0.1"), now)
        .await
        .unwrap()
        .referral_code;

    let result = svc.apply_referral(a, None, &code, now).await;
    assert!(matches!(result, Err(TrialError::CodeNotFound)));
}

#[tokio::test]
async fn test_confirm_without_edge_is_noop() {
    let (svc, _, _) = service();
    let now = Utc::now();

    let outcome = svc.confirm_referral(UserId::new(), now).await.unwrap();
    assert!(!outcome.verified_now);
    assert!(outcome.unlock.is_none());
}

#[tokio::test]
async fn test_confirm_twice_verifies_once() {
    let (svc, _, _) = service();
    let now = Utc::now();

    let a = UserId::new();
    let code = svc
        .start_trial(a, device("10.0.0.1"), now)
        .await
        .unwrap()
        .referral_code;

    let b = UserId::new();
    svc.apply_referral(b, None, &code, now).await.unwrap();
    let first = svc.confirm_referral(b, now).await.unwrap();
    let second = svc.confirm_referral(b, now).await.unwrap();

    assert!(first.verified_now);
    assert!(!second.verified_now);

    let summary = svc.referral_summary(a).await.unwrap();
    assert_eq!(summary.verified, 1);
    assert_eq!(summary.pending, 0);
}

#[tokio::test]
async fn test_status_reports_unlock_state() {
    let (svc, _, _) = service();
    let now = Utc::now();

    let a = UserId::new();
    let code = svc
        .start_trial(a, device("10.0.0.1"), now)
        .await
        .unwrap()
        .referral_code;

    let status = svc.status(a, now).await.unwrap();
    assert_eq!(status.access, TrialAccess::Active);
    assert_eq!(status.referral_code.as_deref(), Some(code.as_str()));
    assert_eq!(status.verified_referrals, 0);
    assert_eq!(status.referrals_required, REFERRALS_REQUIRED);

    for _ in 0..REFERRALS_REQUIRED {
        let referred = UserId::new();
        svc.apply_referral(referred, None, &code, now).await.unwrap();
        svc.confirm_referral(referred, now).await.unwrap();
    }

    let status = svc.status(a, now).await.unwrap();
    assert_eq!(status.access, TrialAccess::Unlocked);
    assert_eq!(status.verified_referrals, REFERRALS_REQUIRED);
    assert_eq!(status.days_remaining, REFERRAL_UNLOCK_DAYS);
}

#[tokio::test]
async fn test_pro_purchase_suppresses_lockout() {
    let (svc, _, _) = service();
    let now = Utc::now();

    let a = UserId::new();
    svc.start_trial(a, device("10.0.0.1"), now).await.unwrap();

    // Well past the 3-day window: locked out.
    let later = now + Duration::days(10);
    let status = svc.status(a, later).await.unwrap();
    assert_eq!(status.access, TrialAccess::LockedOut);
    assert_eq!(status.days_remaining, 0);

    // A purchase event arrives; lockout is suppressed for good.
    svc.record_purchase(a).await.unwrap();
    let status = svc.status(a, later).await.unwrap();
    assert_eq!(status.access, TrialAccess::Pro);
}

#[tokio::test]
async fn test_status_without_trial_fails() {
    let (svc, _, _) = service();
    let result = svc.status(UserId::new(), Utc::now()).await;
    assert!(matches!(result, Err(TrialError::TrialNotFound)));
}
