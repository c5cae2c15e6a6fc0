//! Trial service - ties together evaluation, referral unlocks, and fraud gating

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use nutriq_db::{CreateTrial, DeviceRepository, ReferralRepository, TrialRepository};
use nutriq_types::{TrialAccess, TrialRecord, UserId};

use crate::{
    evaluator,
    fraud::{DeviceInfo, FraudGate},
    referral::{AppliedReferral, ConfirmOutcome, ReferralCoordinator},
    TrialError,
};

/// Days granted at signup
pub const TRIAL_DEFAULT_DAYS: i64 = 3;

/// Result of a trial grant attempt
#[derive(Debug, Clone)]
pub struct TrialGrant {
    /// The user's trial record (fresh or pre-existing)
    pub trial: TrialRecord,
    /// The user's referral code
    pub referral_code: String,
    /// Whether this call created the trial
    pub created: bool,
}

/// Everything a client needs to render trial state
#[derive(Debug, Clone)]
pub struct TrialStatus {
    /// The underlying record
    pub trial: TrialRecord,
    /// Access verdict at evaluation time
    pub access: TrialAccess,
    /// Days remaining, clamped at zero
    pub days_remaining: i64,
    /// The user's referral code, if minted
    pub referral_code: Option<String>,
    /// Verified referral count
    pub verified_referrals: i64,
    /// Unverified referral count
    pub pending_referrals: i64,
    /// Threshold for the unlock
    pub referrals_required: i64,
}

/// Trial service
///
/// Provides the full trial/referral surface:
/// - fraud-gated trial grants at signup
/// - referral application and verification
/// - per-request trial evaluation
pub struct TrialService<T: TrialRepository, R: ReferralRepository, D: DeviceRepository> {
    trials: Arc<T>,
    coordinator: ReferralCoordinator<T, R>,
    gate: FraudGate<D>,
}

impl<T: TrialRepository, R: ReferralRepository, D: DeviceRepository> TrialService<T, R, D> {
    /// Create a new trial service
    pub fn new(trials: Arc<T>, referrals: Arc<R>, devices: Arc<D>) -> Self {
        Self {
            coordinator: ReferralCoordinator::new(Arc::clone(&trials), referrals),
            gate: FraudGate::new(devices),
            trials,
        }
    }

    // =========================================================================
    // Trial Grants
    // =========================================================================

    /// Grant (or re-confirm) the caller's trial
    ///
    /// Runs the fraud gate, then creates the trial record and referral code
    /// on first call. Idempotent: an existing trial is returned untouched
    /// and the IP lock is not refreshed, but the device is always logged.
    pub async fn start_trial(
        &self,
        user_id: UserId,
        device: DeviceInfo,
        now: DateTime<Utc>,
    ) -> Result<TrialGrant, TrialError> {
        self.gate.check_and_log(user_id, &device, now).await?;

        if let Some(existing) = self.trials.find_by_user_id(user_id.0).await? {
            let referral_code = self.coordinator.ensure_code(user_id).await?;
            return Ok(TrialGrant {
                trial: existing.to_record(),
                referral_code,
                created: false,
            });
        }

        let trial = self
            .trials
            .create(CreateTrial {
                user_id: user_id.0,
                trial_end_date: now + Duration::days(TRIAL_DEFAULT_DAYS),
                trial_days_remaining: TRIAL_DEFAULT_DAYS as i32,
            })
            .await?;

        let referral_code = self.coordinator.ensure_code(user_id).await?;
        self.gate
            .register_grant(user_id, &device.ip_address, now)
            .await?;

        info!(user_id = %user_id, "Trial granted");

        Ok(TrialGrant {
            trial: trial.to_record(),
            referral_code,
            created: true,
        })
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Evaluate the caller's trial state
    ///
    /// Re-derived on every call; nothing here is cached across requests.
    pub async fn status(&self, user_id: UserId, now: DateTime<Utc>) -> Result<TrialStatus, TrialError> {
        let trial = self
            .trials
            .find_by_user_id(user_id.0)
            .await?
            .ok_or(TrialError::TrialNotFound)?
            .to_record();

        let summary = self.coordinator.summary(user_id).await?;

        Ok(TrialStatus {
            access: evaluator::access(&trial, now),
            days_remaining: evaluator::days_remaining(trial.trial_end_date, now),
            referral_code: summary.code,
            verified_referrals: summary.verified,
            pending_referrals: summary.pending,
            referrals_required: summary.required,
            trial,
        })
    }

    // =========================================================================
    // Referrals
    // =========================================================================

    /// Apply a referral code for the (newly signed-up) caller
    pub async fn apply_referral(
        &self,
        user_id: UserId,
        email: Option<String>,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<AppliedReferral, TrialError> {
        self.coordinator
            .apply_referral(user_id, email, code, now)
            .await
    }

    /// Record the caller's verification event; may unlock their referrer
    pub async fn confirm_referral(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<ConfirmOutcome, TrialError> {
        self.coordinator.confirm_referral(user_id, now).await
    }

    /// Referral progress for the caller
    pub async fn referral_summary(
        &self,
        user_id: UserId,
    ) -> Result<crate::referral::ReferralSummary, TrialError> {
        self.coordinator.summary(user_id).await
    }

    // =========================================================================
    // Purchases
    // =========================================================================

    /// Record a pro purchase (event arrives from the payment processor)
    pub async fn record_purchase(&self, user_id: UserId) -> Result<(), TrialError> {
        self.trials.set_pro_purchased(user_id.0).await?;
        info!(user_id = %user_id, "Pro purchase recorded");
        Ok(())
    }
}

impl<T: TrialRepository, R: ReferralRepository, D: DeviceRepository> std::fmt::Debug
    for TrialService<T, R, D>
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrialService").finish()
    }
}
