//! Mock repositories for testing
//!
//! In-memory stores that honor the same uniqueness guarantees the
//! Postgres schema enforces.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use nutriq_db::{
    CreateDeviceLog, CreateIpLock, CreateReferral, CreateTrial, DbError, DbResult,
    DeviceLogRow, DeviceRepository, IpTrialLockRow, ReferralCodeRow, ReferralRepository,
    ReferralRow, TrialRepository, TrialRow,
};

/// In-memory trial repository for testing
#[derive(Default, Clone)]
pub struct MockTrialRepository {
    trials: Arc<DashMap<Uuid, TrialRow>>,
}

impl MockTrialRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a trial row directly
    #[allow(dead_code)]
    pub fn insert_trial(&self, trial: TrialRow) {
        self.trials.insert(trial.user_id, trial);
    }
}

#[async_trait]
impl TrialRepository for MockTrialRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> DbResult<Option<TrialRow>> {
        Ok(self.trials.get(&user_id).map(|r| r.value().clone()))
    }

    async fn create(&self, trial: CreateTrial) -> DbResult<TrialRow> {
        if self.trials.contains_key(&trial.user_id) {
            return Err(DbError::UniqueViolation);
        }
        let row = TrialRow {
            user_id: trial.user_id,
            is_trial_active: true,
            trial_end_date: Some(trial.trial_end_date),
            trial_days_remaining: trial.trial_days_remaining,
            trial_unlocked_by_referral: false,
            pro_purchased: false,
            referral_unlock_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.trials.insert(trial.user_id, row.clone());
        Ok(row)
    }

    async fn extend_for_referral(
        &self,
        user_id: Uuid,
        new_end: DateTime<Utc>,
        days_remaining: i32,
        unlock_date: DateTime<Utc>,
    ) -> DbResult<u64> {
        if let Some(mut trial) = self.trials.get_mut(&user_id) {
            if trial.trial_unlocked_by_referral {
                return Ok(0);
            }
            trial.trial_end_date = Some(new_end);
            trial.trial_days_remaining = days_remaining;
            trial.trial_unlocked_by_referral = true;
            trial.referral_unlock_date = Some(unlock_date);
            trial.updated_at = Utc::now();
            return Ok(1);
        }
        Ok(0)
    }

    async fn set_pro_purchased(&self, user_id: Uuid) -> DbResult<()> {
        if let Some(mut trial) = self.trials.get_mut(&user_id) {
            trial.pro_purchased = true;
            trial.updated_at = Utc::now();
        }
        Ok(())
    }
}

/// In-memory referral repository for testing
#[derive(Default, Clone)]
pub struct MockReferralRepository {
    codes: Arc<DashMap<Uuid, ReferralCodeRow>>,
    codes_by_value: Arc<DashMap<String, Uuid>>,
    referrals: Arc<DashMap<Uuid, ReferralRow>>,
    by_referred: Arc<DashMap<Uuid, Uuid>>,
}

impl MockReferralRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReferralRepository for MockReferralRepository {
    async fn find_code_by_user_id(&self, user_id: Uuid) -> DbResult<Option<ReferralCodeRow>> {
        Ok(self.codes.get(&user_id).map(|r| r.value().clone()))
    }

    async fn find_code_owner(&self, code: &str) -> DbResult<Option<ReferralCodeRow>> {
        Ok(self
            .codes_by_value
            .get(code)
            .and_then(|id| self.codes.get(id.value()).map(|r| r.value().clone())))
    }

    async fn create_code(&self, user_id: Uuid, code: &str) -> DbResult<ReferralCodeRow> {
        if self.codes.contains_key(&user_id) || self.codes_by_value.contains_key(code) {
            return Err(DbError::UniqueViolation);
        }
        let row = ReferralCodeRow {
            user_id,
            code: code.to_string(),
            created_at: Utc::now(),
        };
        self.codes_by_value.insert(code.to_string(), user_id);
        self.codes.insert(user_id, row.clone());
        Ok(row)
    }

    async fn create_referral(&self, referral: CreateReferral) -> DbResult<ReferralRow> {
        // Mirrors the unique index on referred_user_id.
        if self.by_referred.contains_key(&referral.referred_user_id) {
            return Err(DbError::UniqueViolation);
        }
        let row = ReferralRow {
            id: referral.id,
            referrer_id: referral.referrer_id,
            referred_user_id: referral.referred_user_id,
            referral_code: referral.referral_code.clone(),
            referred_email: referral.referred_email.clone(),
            is_verified: false,
            verification_method: None,
            verified_at: None,
            created_at: Utc::now(),
        };
        self.by_referred
            .insert(referral.referred_user_id, referral.id);
        self.referrals.insert(referral.id, row.clone());
        Ok(row)
    }

    async fn find_by_referrer(&self, referrer_id: Uuid) -> DbResult<Vec<ReferralRow>> {
        let mut rows: Vec<ReferralRow> = self
            .referrals
            .iter()
            .filter(|r| r.value().referrer_id == referrer_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| b.verified_at.cmp(&a.verified_at));
        Ok(rows)
    }

    async fn count_verified(&self, referrer_id: Uuid) -> DbResult<i64> {
        Ok(self
            .referrals
            .iter()
            .filter(|r| r.value().referrer_id == referrer_id && r.value().is_verified)
            .count() as i64)
    }

    async fn mark_verified(
        &self,
        referred_user_id: Uuid,
        method: &str,
        verified_at: DateTime<Utc>,
    ) -> DbResult<Option<ReferralRow>> {
        let Some(id) = self.by_referred.get(&referred_user_id).map(|r| *r.value()) else {
            return Ok(None);
        };
        if let Some(mut row) = self.referrals.get_mut(&id) {
            if row.is_verified {
                return Ok(None);
            }
            row.is_verified = true;
            row.verification_method = Some(method.to_string());
            row.verified_at = Some(verified_at);
            return Ok(Some(row.value().clone()));
        }
        Ok(None)
    }
}

/// In-memory device repository for testing
#[derive(Default, Clone)]
pub struct MockDeviceRepository {
    logs: Arc<DashMap<Uuid, DeviceLogRow>>,
    locks: Arc<DashMap<String, IpTrialLockRow>>,
}

impl MockDeviceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of audit rows recorded
    #[allow(dead_code)]
    pub fn log_count(&self) -> usize {
        self.logs.len()
    }

    /// Look at the lock for an IP, expired or not
    #[allow(dead_code)]
    pub fn lock_for(&self, ip: &str) -> Option<IpTrialLockRow> {
        self.locks.get(ip).map(|r| r.value().clone())
    }
}

#[async_trait]
impl DeviceRepository for MockDeviceRepository {
    async fn log_device(&self, log: CreateDeviceLog) -> DbResult<DeviceLogRow> {
        let row = DeviceLogRow {
            id: log.id,
            user_id: log.user_id,
            device_id: log.device_id,
            ip_address: log.ip_address,
            user_agent: log.user_agent,
            created_at: Utc::now(),
        };
        self.logs.insert(log.id, row.clone());
        Ok(row)
    }

    async fn find_active_ip_lock(
        &self,
        ip_address: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Option<IpTrialLockRow>> {
        Ok(self
            .locks
            .get(ip_address)
            .filter(|r| r.value().expires_at > now)
            .map(|r| r.value().clone()))
    }

    async fn create_ip_lock(&self, lock: CreateIpLock) -> DbResult<bool> {
        // Mirrors ON CONFLICT DO NOTHING.
        if self.locks.contains_key(&lock.ip_address) {
            return Ok(false);
        }
        let row = IpTrialLockRow {
            ip_address: lock.ip_address.clone(),
            user_id: lock.user_id,
            expires_at: lock.expires_at,
            created_at: Utc::now(),
        };
        self.locks.insert(lock.ip_address, row);
        Ok(true)
    }
}
