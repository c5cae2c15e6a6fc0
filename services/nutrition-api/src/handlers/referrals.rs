//! Referral handlers (apply, confirm, summary)

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::{ApiError, ApiResult};
use crate::extractors::AuthUser;
use crate::handlers::shared::record_op_duration;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApplyReferralRequest {
    pub referral_code: String,
}

#[derive(Debug, Serialize)]
pub struct ApplyReferralResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ConfirmReferralResponse {
    /// Whether this call verified a referral edge
    pub verified: bool,
    /// Whether the referrer crossed the unlock threshold just now
    pub referrer_unlocked: bool,
}

#[derive(Debug, Serialize)]
pub struct ReferralEntry {
    pub referred_email: Option<String>,
    pub is_verified: bool,
    pub verified_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct ReferralsResponse {
    pub referral_code: Option<String>,
    /// Shareable invite link for the code
    pub referral_link: Option<String>,
    pub completed_referrals: i64,
    pub pending_referrals: i64,
    pub referrals_needed: i64,
    pub referrals: Vec<ReferralEntry>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/trial/referral
///
/// Redeem a referral code for the (newly signed-up) caller. Clients treat
/// every failure here as non-fatal for signup; the typed error codes let
/// them tell "bad code" from "already referred".
pub async fn apply_referral(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<ApplyReferralRequest>,
) -> ApiResult<Json<ApplyReferralResponse>> {
    let start = Instant::now();

    let code = req.referral_code.trim();
    if code.is_empty() {
        return Err(ApiError::BadRequest("Referral code required".into()));
    }

    let result = state
        .trial
        .apply_referral(auth_user.user_id, auth_user.email.clone(), code, Utc::now())
        .await;
    record_op_duration("apply_referral", start, result.is_ok());
    result?;

    metrics::counter!("referrals_applied_total").increment(1);

    Ok(Json(ApplyReferralResponse { success: true }))
}

/// POST /api/v1/trial/referral/confirm
///
/// Verification event for the calling (referred) user. Fired by the client
/// after the auth provider confirms the account; idempotent.
pub async fn confirm_referral(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<ConfirmReferralResponse>> {
    let start = Instant::now();

    let outcome = state
        .trial
        .confirm_referral(auth_user.user_id, Utc::now())
        .await;
    record_op_duration("confirm_referral", start, outcome.is_ok());
    let outcome = outcome?;

    let referrer_unlocked = outcome.unlock.is_some();
    if referrer_unlocked {
        metrics::counter!("referral_unlocks_total").increment(1);
    }

    Ok(Json(ConfirmReferralResponse {
        verified: outcome.verified_now,
        referrer_unlocked,
    }))
}

/// GET /api/v1/referrals
///
/// Referral progress for the caller.
pub async fn get_referrals(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<ReferralsResponse>> {
    let start = Instant::now();

    let summary = state.trial.referral_summary(auth_user.user_id).await;
    record_op_duration("get_referrals", start, summary.is_ok());
    let summary = summary?;

    let referral_link = summary
        .code
        .as_deref()
        .map(|code| nutriq_types::referral_link(&state.config.app_origin, code));

    Ok(Json(ReferralsResponse {
        referral_code: summary.code,
        referral_link,
        completed_referrals: summary.verified,
        pending_referrals: summary.pending,
        referrals_needed: summary.required,
        referrals: summary
            .referrals
            .iter()
            .map(|r| ReferralEntry {
                referred_email: r.referred_email.clone(),
                is_verified: r.is_verified,
                verified_at: r.verified_at.map(|d| d.to_rfc3339()),
                created_at: r.created_at.to_rfc3339(),
            })
            .collect(),
    }))
}
