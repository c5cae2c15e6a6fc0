//! PostgreSQL trial subscription repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::TrialRow;
use crate::repo::{CreateTrial, TrialRepository};

/// PostgreSQL trial repository
#[derive(Clone)]
pub struct PgTrialRepository {
    pool: PgPool,
}

impl PgTrialRepository {
    /// Create a new trial repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrialRepository for PgTrialRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> DbResult<Option<TrialRow>> {
        let trial = sqlx::query_as::<_, TrialRow>(
            r#"
            SELECT user_id, is_trial_active, trial_end_date, trial_days_remaining,
                   trial_unlocked_by_referral, pro_purchased, referral_unlock_date,
                   created_at, updated_at
            FROM trial_subscriptions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(trial)
    }

    async fn create(&self, trial: CreateTrial) -> DbResult<TrialRow> {
        let row = sqlx::query_as::<_, TrialRow>(
            r#"
            INSERT INTO trial_subscriptions (user_id, is_trial_active, trial_end_date,
                                             trial_days_remaining)
            VALUES ($1, TRUE, $2, $3)
            RETURNING user_id, is_trial_active, trial_end_date, trial_days_remaining,
                      trial_unlocked_by_referral, pro_purchased, referral_unlock_date,
                      created_at, updated_at
            "#,
        )
        .bind(trial.user_id)
        .bind(trial.trial_end_date)
        .bind(trial.trial_days_remaining)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn extend_for_referral(
        &self,
        user_id: Uuid,
        new_end: DateTime<Utc>,
        days_remaining: i32,
        unlock_date: DateTime<Utc>,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE trial_subscriptions
            SET trial_end_date = $1,
                trial_days_remaining = $2,
                trial_unlocked_by_referral = TRUE,
                referral_unlock_date = $3,
                updated_at = NOW()
            WHERE user_id = $4 AND trial_unlocked_by_referral = FALSE
            "#,
        )
        .bind(new_end)
        .bind(days_remaining)
        .bind(unlock_date)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn set_pro_purchased(&self, user_id: Uuid) -> DbResult<()> {
        sqlx::query(
            "UPDATE trial_subscriptions SET pro_purchased = TRUE, updated_at = NOW() WHERE user_id = $1",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
