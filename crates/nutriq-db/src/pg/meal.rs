//! PostgreSQL meal repository implementation

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::MealRow;
use crate::repo::{CreateMeal, MealRepository};

/// PostgreSQL meal repository
#[derive(Clone)]
pub struct PgMealRepository {
    pool: PgPool,
}

impl PgMealRepository {
    /// Create a new meal repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MealRepository for PgMealRepository {
    async fn find_by_user_and_date(&self, user_id: Uuid, date: NaiveDate) -> DbResult<Vec<MealRow>> {
        let meals = sqlx::query_as::<_, MealRow>(
            r#"
            SELECT id, user_id, name, calories, protein_g, carbs_g, fat_g, fiber_g,
                   meal_type, date, created_at
            FROM meals
            WHERE user_id = $1 AND date = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(meals)
    }

    async fn find_by_user_between(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<MealRow>> {
        let meals = sqlx::query_as::<_, MealRow>(
            r#"
            SELECT id, user_id, name, calories, protein_g, carbs_g, fat_g, fiber_g,
                   meal_type, date, created_at
            FROM meals
            WHERE user_id = $1 AND date >= $2 AND date <= $3
            ORDER BY date ASC, created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(meals)
    }

    async fn create(&self, meal: CreateMeal) -> DbResult<MealRow> {
        let row = sqlx::query_as::<_, MealRow>(
            r#"
            INSERT INTO meals (id, user_id, name, calories, protein_g, carbs_g, fat_g,
                               fiber_g, meal_type, date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, user_id, name, calories, protein_g, carbs_g, fat_g, fiber_g,
                      meal_type, date, created_at
            "#,
        )
        .bind(meal.id)
        .bind(meal.user_id)
        .bind(&meal.name)
        .bind(meal.calories)
        .bind(meal.protein_g)
        .bind(meal.carbs_g)
        .bind(meal.fat_g)
        .bind(meal.fiber_g)
        .bind(&meal.meal_type)
        .bind(meal.date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM meals WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
