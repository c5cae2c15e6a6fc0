//! Meal handlers (logging, listing, daily/weekly summaries)

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;

use nutriq_db::{CreateMeal, MealRepository, MealRow};
use nutriq_types::{DailyTotals, MealType};

use crate::error::{ApiError, ApiResult};
use crate::extractors::AuthUser;
use crate::handlers::shared::{
    parse_date, record_op_duration, validate_calories, validate_macro, validate_meal_name,
};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct MealsQuery {
    /// ISO date; defaults to today
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    pub name: String,
    pub calories: i32,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub fiber_g: Option<f64>,
    pub meal_type: String,
    /// ISO date; defaults to today
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MealResponse {
    pub id: String,
    pub name: String,
    pub calories: i32,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub fiber_g: Option<f64>,
    pub meal_type: String,
    pub date: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct MealListResponse {
    pub date: String,
    pub meals: Vec<MealResponse>,
    pub totals: DailyTotals,
}

#[derive(Debug, Serialize)]
pub struct DailySummaryResponse {
    pub date: String,
    pub totals: DailyTotals,
    pub meal_count: usize,
}

#[derive(Debug, Serialize)]
pub struct WeeklySummaryResponse {
    pub from: String,
    pub to: String,
    pub days: Vec<DailySummaryResponse>,
    pub totals: DailyTotals,
}

#[derive(Debug, Serialize)]
pub struct DeleteMealResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct WeeklyQuery {
    /// Last day of the window; defaults to today
    pub end: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

fn to_response(meal: &MealRow) -> MealResponse {
    MealResponse {
        id: meal.id.to_string(),
        name: meal.name.clone(),
        calories: meal.calories,
        protein_g: meal.protein_g,
        carbs_g: meal.carbs_g,
        fat_g: meal.fat_g,
        fiber_g: meal.fiber_g,
        meal_type: meal.meal_type.clone(),
        date: meal.date.to_string(),
        created_at: meal.created_at.to_rfc3339(),
    }
}

fn totals_for(meals: &[MealRow]) -> DailyTotals {
    let mut totals = DailyTotals::default();
    for meal in meals {
        totals.add(meal.calories, meal.protein_g, meal.carbs_g, meal.fat_g);
    }
    totals
}

fn resolve_date(value: Option<&str>, field_name: &str) -> Result<NaiveDate, ApiError> {
    match value {
        Some(s) => parse_date(s, field_name),
        None => Ok(Utc::now().date_naive()),
    }
}

/// GET /api/v1/meals?date=YYYY-MM-DD
pub async fn list_meals(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<MealsQuery>,
) -> ApiResult<Json<MealListResponse>> {
    let start = Instant::now();
    let date = resolve_date(query.date.as_deref(), "date")?;

    let meals = state
        .repos
        .meals
        .find_by_user_and_date(auth_user.user_id.0, date)
        .await;
    record_op_duration("list_meals", start, meals.is_ok());
    let meals = meals?;

    Ok(Json(MealListResponse {
        date: date.to_string(),
        totals: totals_for(&meals),
        meals: meals.iter().map(to_response).collect(),
    }))
}

/// POST /api/v1/meals
pub async fn create_meal(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreateMealRequest>,
) -> ApiResult<Json<MealResponse>> {
    let start = Instant::now();

    validate_meal_name(&req.name)?;
    validate_calories(req.calories)?;
    validate_macro(req.protein_g, "protein_g")?;
    validate_macro(req.carbs_g, "carbs_g")?;
    validate_macro(req.fat_g, "fat_g")?;
    validate_macro(req.fiber_g, "fiber_g")?;

    let meal_type: MealType = req
        .meal_type
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid meal type: {}", req.meal_type)))?;

    let date = resolve_date(req.date.as_deref(), "date")?;

    let meal = state
        .repos
        .meals
        .create(CreateMeal {
            id: Uuid::new_v4(),
            user_id: auth_user.user_id.0,
            name: req.name.trim().to_string(),
            calories: req.calories,
            protein_g: req.protein_g,
            carbs_g: req.carbs_g,
            fat_g: req.fat_g,
            fiber_g: req.fiber_g,
            meal_type: meal_type.to_string(),
            date,
        })
        .await;
    record_op_duration("create_meal", start, meal.is_ok());
    let meal = meal?;

    metrics::counter!("meals_logged_total", "source" => "manual").increment(1);
    tracing::info!(user_id = %auth_user.user_id, calories = meal.calories, "Meal logged");

    Ok(Json(to_response(&meal)))
}

/// DELETE /api/v1/meals/{id}
pub async fn delete_meal(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteMealResponse>> {
    let start = Instant::now();

    let deleted = state.repos.meals.delete(id, auth_user.user_id.0).await;
    record_op_duration("delete_meal", start, deleted.is_ok());

    if deleted? == 0 {
        return Err(ApiError::NotFound("meal".into()));
    }

    Ok(Json(DeleteMealResponse { success: true }))
}

/// GET /api/v1/summary/daily?date=YYYY-MM-DD
pub async fn daily_summary(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<MealsQuery>,
) -> ApiResult<Json<DailySummaryResponse>> {
    let start = Instant::now();
    let date = resolve_date(query.date.as_deref(), "date")?;

    let meals = state
        .repos
        .meals
        .find_by_user_and_date(auth_user.user_id.0, date)
        .await;
    record_op_duration("daily_summary", start, meals.is_ok());
    let meals = meals?;

    Ok(Json(DailySummaryResponse {
        date: date.to_string(),
        totals: totals_for(&meals),
        meal_count: meals.len(),
    }))
}

/// GET /api/v1/summary/weekly?end=YYYY-MM-DD
///
/// Seven days ending at `end`, inclusive.
pub async fn weekly_summary(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<WeeklyQuery>,
) -> ApiResult<Json<WeeklySummaryResponse>> {
    let start = Instant::now();
    let to = resolve_date(query.end.as_deref(), "end")?;
    let from = to - Duration::days(6);

    let meals = state
        .repos
        .meals
        .find_by_user_between(auth_user.user_id.0, from, to)
        .await;
    record_op_duration("weekly_summary", start, meals.is_ok());
    let meals = meals?;

    let mut days = Vec::with_capacity(7);
    for offset in 0..7 {
        let date = from + Duration::days(offset);
        let day_meals: Vec<&MealRow> = meals.iter().filter(|m| m.date == date).collect();
        let mut totals = DailyTotals::default();
        for meal in &day_meals {
            totals.add(meal.calories, meal.protein_g, meal.carbs_g, meal.fat_g);
        }
        days.push(DailySummaryResponse {
            date: date.to_string(),
            totals,
            meal_count: day_meals.len(),
        });
    }

    Ok(Json(WeeklySummaryResponse {
        from: from.to_string(),
        to: to.to_string(),
        totals: totals_for(&meals),
        days,
    }))
}
