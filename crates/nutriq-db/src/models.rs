//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Trial subscription row from the database
#[derive(Debug, Clone, FromRow)]
pub struct TrialRow {
    pub user_id: Uuid,
    pub is_trial_active: bool,
    pub trial_end_date: Option<DateTime<Utc>>,
    pub trial_days_remaining: i32,
    pub trial_unlocked_by_referral: bool,
    pub pro_purchased: bool,
    pub referral_unlock_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Referral code row from the database
#[derive(Debug, Clone, FromRow)]
pub struct ReferralCodeRow {
    pub user_id: Uuid,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

/// Referral edge row from the database
#[derive(Debug, Clone, FromRow)]
pub struct ReferralRow {
    pub id: Uuid,
    pub referrer_id: Uuid,
    pub referred_user_id: Uuid,
    pub referral_code: String,
    pub referred_email: Option<String>,
    pub is_verified: bool,
    pub verification_method: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Device log row from the database (append-only audit trail)
#[derive(Debug, Clone, FromRow)]
pub struct DeviceLogRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub device_id: String,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// IP trial lock row from the database
#[derive(Debug, Clone, FromRow)]
pub struct IpTrialLockRow {
    pub ip_address: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Meal row from the database
#[derive(Debug, Clone, FromRow)]
pub struct MealRow {
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
    pub created_at: DateTime<Utc>,
}

/// Profile row from the database
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub activity_level: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Goals row from the database
#[derive(Debug, Clone, FromRow)]
pub struct GoalsRow {
    pub user_id: Uuid,
    pub daily_calories: i32,
    pub daily_protein_g: i32,
    pub daily_carbs_g: i32,
    pub daily_fat_g: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Conversion implementations from row types to nutriq-types domain types

impl TrialRow {
    /// Convert to the domain trial record
    pub fn to_record(&self) -> nutriq_types::TrialRecord {
        nutriq_types::TrialRecord {
            user_id: nutriq_types::UserId(self.user_id),
            is_trial_active: self.is_trial_active,
            trial_end_date: self.trial_end_date,
            trial_days_remaining: self.trial_days_remaining,
            trial_unlocked_by_referral: self.trial_unlocked_by_referral,
            pro_purchased: self.pro_purchased,
            referral_unlock_date: self.referral_unlock_date,
            created_at: self.created_at,
        }
    }
}

impl ReferralRow {
    /// Convert to the domain referral edge
    pub fn to_referral(&self) -> nutriq_types::Referral {
        nutriq_types::Referral {
            id: nutriq_types::ReferralId(self.id),
            referrer_id: nutriq_types::UserId(self.referrer_id),
            referred_user_id: nutriq_types::UserId(self.referred_user_id),
            referral_code: self.referral_code.clone(),
            referred_email: self.referred_email.clone(),
            is_verified: self.is_verified,
            verification_method: self
                .verification_method
                .as_deref()
                .and_then(|m| m.parse().ok()),
            verified_at: self.verified_at,
            created_at: self.created_at,
        }
    }
}
