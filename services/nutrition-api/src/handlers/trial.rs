//! Trial handlers (status, device registration)

use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Instant;

use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::handlers::shared::{client_ip, record_op_duration, user_agent, validate_device_id};
use crate::state::AppState;

use nutriq_trial_core::DeviceInfo;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TrialInfo {
    pub is_trial_active: bool,
    pub trial_end_date: Option<String>,
    pub trial_days_remaining: i64,
    pub trial_unlocked_by_referral: bool,
    pub pro_purchased: bool,
    pub referral_unlock_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TrialStatusResponse {
    pub trial: TrialInfo,
    /// Access verdict: pro, unlocked, active, or locked_out
    pub access: String,
    pub referral_code: Option<String>,
    pub completed_referrals: i64,
    pub pending_referrals: i64,
    pub referrals_needed: i64,
}

#[derive(Debug, Deserialize)]
pub struct RegisterDeviceRequest {
    pub device_id: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterDeviceResponse {
    pub success: bool,
    /// Whether this call granted the trial
    pub trial_created: bool,
    pub trial_end_date: Option<String>,
    pub referral_code: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/trial/status
///
/// Evaluate the caller's trial state. Derived fresh on every call.
pub async fn trial_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<TrialStatusResponse>> {
    let start = Instant::now();

    let status = state.trial.status(auth_user.user_id, Utc::now()).await;
    record_op_duration("trial_status", start, status.is_ok());
    let status = status?;

    Ok(Json(TrialStatusResponse {
        trial: TrialInfo {
            is_trial_active: status.trial.is_trial_active,
            trial_end_date: status.trial.trial_end_date.map(|d| d.to_rfc3339()),
            trial_days_remaining: status.days_remaining,
            trial_unlocked_by_referral: status.trial.trial_unlocked_by_referral,
            pro_purchased: status.trial.pro_purchased,
            referral_unlock_date: status.trial.referral_unlock_date.map(|d| d.to_rfc3339()),
        },
        access: status.access.to_string(),
        referral_code: status.referral_code,
        completed_referrals: status.verified_referrals,
        pending_referrals: status.pending_referrals,
        referrals_needed: status.referrals_required,
    }))
}

/// POST /api/v1/trial/device
///
/// Log the signup device and grant the trial if the fraud gate allows it.
/// A fraud lock blocks the grant, not the account itself.
pub async fn register_device(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    auth_user: AuthUser,
    headers: HeaderMap,
    Json(req): Json<RegisterDeviceRequest>,
) -> ApiResult<Json<RegisterDeviceResponse>> {
    let start = Instant::now();

    validate_device_id(&req.device_id)?;

    let device = DeviceInfo {
        device_id: req.device_id,
        ip_address: client_ip(&headers, addr),
        user_agent: user_agent(&headers),
    };

    let grant = state
        .trial
        .start_trial(auth_user.user_id, device, Utc::now())
        .await;
    record_op_duration("register_device", start, grant.is_ok());
    let grant = grant?;

    if grant.created {
        metrics::counter!("trial_grants_total").increment(1);
        tracing::info!(user_id = %auth_user.user_id, "Trial granted at signup");
    }

    Ok(Json(RegisterDeviceResponse {
        success: true,
        trial_created: grant.created,
        trial_end_date: grant.trial.trial_end_date.map(|d| d.to_rfc3339()),
        referral_code: grant.referral_code,
    }))
}
