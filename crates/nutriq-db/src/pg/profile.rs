//! PostgreSQL profile and goals repository implementation

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::{GoalsRow, ProfileRow};
use crate::repo::{ProfileRepository, UpdateGoals, UpdateProfile};

/// PostgreSQL profile repository
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    /// Create a new profile repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find_profile(&self, user_id: Uuid) -> DbResult<Option<ProfileRow>> {
        let profile = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_id, email, first_name, last_name, age, gender, height_cm,
                   weight_kg, activity_level, created_at, updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn create_profile(&self, user_id: Uuid, email: &str) -> DbResult<ProfileRow> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO profiles (user_id, email)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET email = EXCLUDED.email
            RETURNING user_id, email, first_name, last_name, age, gender, height_cm,
                      weight_kg, activity_level, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_profile(&self, profile: UpdateProfile) -> DbResult<ProfileRow> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            UPDATE profiles
            SET first_name = $1, last_name = $2, age = $3, gender = $4,
                height_cm = $5, weight_kg = $6, activity_level = $7, updated_at = NOW()
            WHERE user_id = $8
            RETURNING user_id, email, first_name, last_name, age, gender, height_cm,
                      weight_kg, activity_level, created_at, updated_at
            "#,
        )
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(profile.age)
        .bind(&profile.gender)
        .bind(profile.height_cm)
        .bind(profile.weight_kg)
        .bind(&profile.activity_level)
        .bind(profile.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_goals(&self, user_id: Uuid) -> DbResult<Option<GoalsRow>> {
        let goals = sqlx::query_as::<_, GoalsRow>(
            r#"
            SELECT user_id, daily_calories, daily_protein_g, daily_carbs_g, daily_fat_g,
                   created_at, updated_at
            FROM goals
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(goals)
    }

    async fn create_goals(&self, user_id: Uuid) -> DbResult<GoalsRow> {
        let row = sqlx::query_as::<_, GoalsRow>(
            r#"
            INSERT INTO goals (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING user_id, daily_calories, daily_protein_g, daily_carbs_g, daily_fat_g,
                      created_at, updated_at
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        // The conflict path returns no row; re-read for the caller.
        match row {
            Some(row) => Ok(row),
            None => self
                .find_goals(user_id)
                .await?
                .ok_or(crate::error::DbError::NotFound),
        }
    }

    async fn update_goals(&self, goals: UpdateGoals) -> DbResult<GoalsRow> {
        let row = sqlx::query_as::<_, GoalsRow>(
            r#"
            UPDATE goals
            SET daily_calories = $1, daily_protein_g = $2, daily_carbs_g = $3,
                daily_fat_g = $4, updated_at = NOW()
            WHERE user_id = $5
            RETURNING user_id, daily_calories, daily_protein_g, daily_carbs_g, daily_fat_g,
                      created_at, updated_at
            "#,
        )
        .bind(goals.daily_calories)
        .bind(goals.daily_protein_g)
        .bind(goals.daily_carbs_g)
        .bind(goals.daily_fat_g)
        .bind(goals.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}
