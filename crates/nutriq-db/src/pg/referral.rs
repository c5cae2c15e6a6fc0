//! PostgreSQL referral repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::{ReferralCodeRow, ReferralRow};
use crate::repo::{CreateReferral, ReferralRepository};

/// PostgreSQL referral repository
#[derive(Clone)]
pub struct PgReferralRepository {
    pool: PgPool,
}

impl PgReferralRepository {
    /// Create a new referral repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferralRepository for PgReferralRepository {
    async fn find_code_by_user_id(&self, user_id: Uuid) -> DbResult<Option<ReferralCodeRow>> {
        let code = sqlx::query_as::<_, ReferralCodeRow>(
            "SELECT user_id, code, created_at FROM referral_codes WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(code)
    }

    async fn find_code_owner(&self, code: &str) -> DbResult<Option<ReferralCodeRow>> {
        let owner = sqlx::query_as::<_, ReferralCodeRow>(
            "SELECT user_id, code, created_at FROM referral_codes WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(owner)
    }

    async fn create_code(&self, user_id: Uuid, code: &str) -> DbResult<ReferralCodeRow> {
        let row = sqlx::query_as::<_, ReferralCodeRow>(
            r#"
            INSERT INTO referral_codes (user_id, code)
            VALUES ($1, $2)
            RETURNING user_id, code, created_at
            "#,
        )
        .bind(user_id)
        .bind(code)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn create_referral(&self, referral: CreateReferral) -> DbResult<ReferralRow> {
        let row = sqlx::query_as::<_, ReferralRow>(
            r#"
            INSERT INTO referrals (id, referrer_id, referred_user_id, referral_code,
                                   referred_email)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, referrer_id, referred_user_id, referral_code, referred_email,
                      is_verified, verification_method, verified_at, created_at
            "#,
        )
        .bind(referral.id)
        .bind(referral.referrer_id)
        .bind(referral.referred_user_id)
        .bind(&referral.referral_code)
        .bind(&referral.referred_email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_referrer(&self, referrer_id: Uuid) -> DbResult<Vec<ReferralRow>> {
        let referrals = sqlx::query_as::<_, ReferralRow>(
            r#"
            SELECT id, referrer_id, referred_user_id, referral_code, referred_email,
                   is_verified, verification_method, verified_at, created_at
            FROM referrals
            WHERE referrer_id = $1
            ORDER BY verified_at DESC NULLS LAST, created_at DESC
            "#,
        )
        .bind(referrer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(referrals)
    }

    async fn count_verified(&self, referrer_id: Uuid) -> DbResult<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM referrals WHERE referrer_id = $1 AND is_verified = TRUE",
        )
        .bind(referrer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    async fn mark_verified(
        &self,
        referred_user_id: Uuid,
        method: &str,
        verified_at: DateTime<Utc>,
    ) -> DbResult<Option<ReferralRow>> {
        let row = sqlx::query_as::<_, ReferralRow>(
            r#"
            UPDATE referrals
            SET is_verified = TRUE, verification_method = $1, verified_at = $2
            WHERE referred_user_id = $3 AND is_verified = FALSE
            RETURNING id, referrer_id, referred_user_id, referral_code, referred_email,
                      is_verified, verification_method, verified_at, created_at
            "#,
        )
        .bind(method)
        .bind(verified_at)
        .bind(referred_user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }
}
