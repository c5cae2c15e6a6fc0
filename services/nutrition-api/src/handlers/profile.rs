//! Profile and goals handlers

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use nutriq_db::{GoalsRow, ProfileRepository, ProfileRow, UpdateGoals, UpdateProfile};

use crate::error::{ApiError, ApiResult};
use crate::extractors::AuthUser;
use crate::handlers::shared::record_op_duration;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub activity_level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub activity_level: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GoalsResponse {
    pub daily_calories: i32,
    pub daily_protein_g: i32,
    pub daily_carbs_g: i32,
    pub daily_fat_g: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGoalsRequest {
    pub daily_calories: i32,
    pub daily_protein_g: i32,
    pub daily_carbs_g: i32,
    pub daily_fat_g: i32,
}

fn profile_response(row: &ProfileRow) -> ProfileResponse {
    ProfileResponse {
        email: row.email.clone(),
        first_name: row.first_name.clone(),
        last_name: row.last_name.clone(),
        age: row.age,
        gender: row.gender.clone(),
        height_cm: row.height_cm,
        weight_kg: row.weight_kg,
        activity_level: row.activity_level.clone(),
    }
}

fn goals_response(row: &GoalsRow) -> GoalsResponse {
    GoalsResponse {
        daily_calories: row.daily_calories,
        daily_protein_g: row.daily_protein_g,
        daily_carbs_g: row.daily_carbs_g,
        daily_fat_g: row.daily_fat_g,
    }
}

// ============================================================================
// Validation
// ============================================================================

fn validate_profile(req: &UpdateProfileRequest) -> Result<(), ApiError> {
    if let Some(age) = req.age {
        if !(13..=120).contains(&age) {
            return Err(ApiError::BadRequest("age out of range (13..120)".into()));
        }
    }
    if let Some(height) = req.height_cm {
        if !(50.0..=260.0).contains(&height) {
            return Err(ApiError::BadRequest("height_cm out of range".into()));
        }
    }
    if let Some(weight) = req.weight_kg {
        if !(20.0..=400.0).contains(&weight) {
            return Err(ApiError::BadRequest("weight_kg out of range".into()));
        }
    }
    Ok(())
}

fn validate_goals(req: &UpdateGoalsRequest) -> Result<(), ApiError> {
    if !(500..=10_000).contains(&req.daily_calories) {
        return Err(ApiError::BadRequest(
            "daily_calories out of range (500..10000)".into(),
        ));
    }
    for (value, name) in [
        (req.daily_protein_g, "daily_protein_g"),
        (req.daily_carbs_g, "daily_carbs_g"),
        (req.daily_fat_g, "daily_fat_g"),
    ] {
        if !(0..=2_000).contains(&value) {
            return Err(ApiError::BadRequest(format!("{name} out of range (0..2000)")));
        }
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// Fetch the profile, creating it with defaults on first read.
async fn ensure_profile(state: &AppState, auth_user: &AuthUser) -> ApiResult<ProfileRow> {
    if let Some(profile) = state
        .repos
        .profiles
        .find_profile(auth_user.user_id.0)
        .await?
    {
        return Ok(profile);
    }

    let email = auth_user.email.clone().unwrap_or_default();
    Ok(state
        .repos
        .profiles
        .create_profile(auth_user.user_id.0, &email)
        .await?)
}

/// GET /api/v1/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<ProfileResponse>> {
    let start = Instant::now();
    let profile = ensure_profile(&state, &auth_user).await;
    record_op_duration("get_profile", start, profile.is_ok());
    Ok(Json(profile_response(&profile?)))
}

/// PUT /api/v1/profile
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    let start = Instant::now();
    validate_profile(&req)?;

    // Lazy-create so a PUT straight after signup works.
    ensure_profile(&state, &auth_user).await?;

    let updated = state
        .repos
        .profiles
        .update_profile(UpdateProfile {
            user_id: auth_user.user_id.0,
            first_name: req.first_name,
            last_name: req.last_name,
            age: req.age,
            gender: req.gender,
            height_cm: req.height_cm,
            weight_kg: req.weight_kg,
            activity_level: req.activity_level,
        })
        .await;
    record_op_duration("update_profile", start, updated.is_ok());

    Ok(Json(profile_response(&updated?)))
}

/// GET /api/v1/goals
pub async fn get_goals(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<GoalsResponse>> {
    let start = Instant::now();

    let goals = match state.repos.profiles.find_goals(auth_user.user_id.0).await? {
        Some(goals) => Ok(goals),
        None => state.repos.profiles.create_goals(auth_user.user_id.0).await,
    };
    record_op_duration("get_goals", start, goals.is_ok());

    Ok(Json(goals_response(&goals?)))
}

/// PUT /api/v1/goals
pub async fn update_goals(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<UpdateGoalsRequest>,
) -> ApiResult<Json<GoalsResponse>> {
    let start = Instant::now();
    validate_goals(&req)?;

    // Lazy-create so a PUT straight after signup works.
    if state
        .repos
        .profiles
        .find_goals(auth_user.user_id.0)
        .await?
        .is_none()
    {
        state.repos.profiles.create_goals(auth_user.user_id.0).await?;
    }

    let updated = state
        .repos
        .profiles
        .update_goals(UpdateGoals {
            user_id: auth_user.user_id.0,
            daily_calories: req.daily_calories,
            daily_protein_g: req.daily_protein_g,
            daily_carbs_g: req.daily_carbs_g,
            daily_fat_g: req.daily_fat_g,
        })
        .await;
    record_op_duration("update_goals", start, updated.is_ok());

    Ok(Json(goals_response(&updated?)))
}
