//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::*;

/// Trial subscription repository trait
#[async_trait]
pub trait TrialRepository: Send + Sync {
    /// Find the trial record for a user
    async fn find_by_user_id(&self, user_id: Uuid) -> DbResult<Option<TrialRow>>;

    /// Create a trial record
    async fn create(&self, trial: CreateTrial) -> DbResult<TrialRow>;

    /// Apply the referral unlock extension
    ///
    /// The update is conditioned on `trial_unlocked_by_referral = FALSE` so
    /// re-tallying at or above the threshold never extends twice. Returns
    /// the number of rows changed (0 means already unlocked).
    async fn extend_for_referral(
        &self,
        user_id: Uuid,
        new_end: DateTime<Utc>,
        days_remaining: i32,
        unlock_date: DateTime<Utc>,
    ) -> DbResult<u64>;

    /// Record a pro purchase
    async fn set_pro_purchased(&self, user_id: Uuid) -> DbResult<()>;
}

/// Create trial input
#[derive(Debug, Clone)]
pub struct CreateTrial {
    pub user_id: Uuid,
    pub trial_end_date: DateTime<Utc>,
    pub trial_days_remaining: i32,
}

/// Referral code + edge repository trait
#[async_trait]
pub trait ReferralRepository: Send + Sync {
    /// Find a user's referral code
    async fn find_code_by_user_id(&self, user_id: Uuid) -> DbResult<Option<ReferralCodeRow>>;

    /// Find the owner of a referral code
    async fn find_code_owner(&self, code: &str) -> DbResult<Option<ReferralCodeRow>>;

    /// Mint a referral code for a user
    async fn create_code(&self, user_id: Uuid, code: &str) -> DbResult<ReferralCodeRow>;

    /// Insert a referral edge
    ///
    /// The unique index on `referred_user_id` makes this the atomic
    /// duplicate check; a unique violation surfaces through `DbError`.
    async fn create_referral(&self, referral: CreateReferral) -> DbResult<ReferralRow>;

    /// List edges for a referrer, newest verification first
    async fn find_by_referrer(&self, referrer_id: Uuid) -> DbResult<Vec<ReferralRow>>;

    /// Count verified edges for a referrer
    async fn count_verified(&self, referrer_id: Uuid) -> DbResult<i64>;

    /// Mark the referred user's edge as verified
    ///
    /// Returns the updated edge, or None when no edge exists or it was
    /// already verified.
    async fn mark_verified(
        &self,
        referred_user_id: Uuid,
        method: &str,
        verified_at: DateTime<Utc>,
    ) -> DbResult<Option<ReferralRow>>;
}

/// Create referral edge input
#[derive(Debug, Clone)]
pub struct CreateReferral {
    pub id: Uuid,
    pub referrer_id: Uuid,
    pub referred_user_id: Uuid,
    pub referral_code: String,
    pub referred_email: Option<String>,
}

/// Device log and IP lock repository trait
#[async_trait]
pub trait DeviceRepository: Send + Sync {
    /// Append a device log row (audit trail, always written)
    async fn log_device(&self, log: CreateDeviceLog) -> DbResult<DeviceLogRow>;

    /// Find the active (non-expired) trial lock for an IP
    async fn find_active_ip_lock(
        &self,
        ip_address: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Option<IpTrialLockRow>>;

    /// Create the trial lock for an IP if none exists
    ///
    /// Atomic insert-if-absent; returns true when this call created the
    /// lock, false when another grant already holds the IP.
    async fn create_ip_lock(&self, lock: CreateIpLock) -> DbResult<bool>;
}

/// Create device log input
#[derive(Debug, Clone)]
pub struct CreateDeviceLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub device_id: String,
    pub ip_address: String,
    pub user_agent: Option<String>,
}

/// Create IP lock input
#[derive(Debug, Clone)]
pub struct CreateIpLock {
    pub ip_address: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Meal repository trait
#[async_trait]
pub trait MealRepository: Send + Sync {
    /// List a user's meals for one day, newest first
    async fn find_by_user_and_date(&self, user_id: Uuid, date: NaiveDate) -> DbResult<Vec<MealRow>>;

    /// List a user's meals over an inclusive date range
    async fn find_by_user_between(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<MealRow>>;

    /// Create a meal
    async fn create(&self, meal: CreateMeal) -> DbResult<MealRow>;

    /// Delete a user's meal; returns rows deleted
    async fn delete(&self, id: Uuid, user_id: Uuid) -> DbResult<u64>;
}

/// Create meal input
#[derive(Debug, Clone)]
pub struct CreateMeal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub calories: i32,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub fiber_g: Option<f64>,
    pub meal_type: String,
    pub date: NaiveDate,
}

/// Profile and goals repository trait
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Find a user's profile
    async fn find_profile(&self, user_id: Uuid) -> DbResult<Option<ProfileRow>>;

    /// Create a profile with defaults
    async fn create_profile(&self, user_id: Uuid, email: &str) -> DbResult<ProfileRow>;

    /// Update profile fields
    async fn update_profile(&self, profile: UpdateProfile) -> DbResult<ProfileRow>;

    /// Find a user's goals
    async fn find_goals(&self, user_id: Uuid) -> DbResult<Option<GoalsRow>>;

    /// Create goals with defaults
    async fn create_goals(&self, user_id: Uuid) -> DbResult<GoalsRow>;

    /// Update goal targets
    async fn update_goals(&self, goals: UpdateGoals) -> DbResult<GoalsRow>;
}

/// Update profile input
#[derive(Debug, Clone)]
pub struct UpdateProfile {
    pub user_id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub activity_level: Option<String>,
}

/// Update goals input
#[derive(Debug, Clone)]
pub struct UpdateGoals {
    pub user_id: Uuid,
    pub daily_calories: i32,
    pub daily_protein_g: i32,
    pub daily_carbs_g: i32,
    pub daily_fat_g: i32,
}
