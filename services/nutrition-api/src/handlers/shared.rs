//! Shared handler utilities
//!
//! Common validation, metrics, and helper functions used across handlers.
//! Centralizing these ensures consistent security policies and metrics.

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::{header, HeaderMap};
use chrono::NaiveDate;

use crate::error::ApiError;

// ============================================================================
// Input Validation
// ============================================================================

/// Maximum length for meal names
pub const MAX_MEAL_NAME_LEN: usize = 120;

/// Upper bound for a single meal's calories
pub const MAX_MEAL_CALORIES: i32 = 20_000;

/// Upper bound for a single macro value in grams
pub const MAX_MACRO_GRAMS: f64 = 5_000.0;

/// Maximum length for client-supplied device fingerprints
pub const MAX_DEVICE_ID_LEN: usize = 128;

/// Validate a user-supplied meal name.
pub fn validate_meal_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest("Meal name cannot be empty".into()));
    }

    if name.len() > MAX_MEAL_NAME_LEN {
        return Err(ApiError::BadRequest(format!(
            "Meal name too long (max {MAX_MEAL_NAME_LEN} chars)"
        )));
    }

    if name.chars().any(char::is_control) {
        return Err(ApiError::BadRequest(
            "Meal name contains control characters".into(),
        ));
    }

    Ok(())
}

/// Validate a calorie count for one meal.
pub fn validate_calories(calories: i32) -> Result<(), ApiError> {
    if calories <= 0 {
        return Err(ApiError::BadRequest("Calories must be positive".into()));
    }
    if calories > MAX_MEAL_CALORIES {
        return Err(ApiError::BadRequest(format!(
            "Calories out of range (max {MAX_MEAL_CALORIES})"
        )));
    }
    Ok(())
}

/// Validate an optional macro value in grams.
pub fn validate_macro(value: Option<f64>, field_name: &str) -> Result<(), ApiError> {
    if let Some(v) = value {
        if !v.is_finite() || v < 0.0 || v > MAX_MACRO_GRAMS {
            return Err(ApiError::BadRequest(format!(
                "{field_name} out of range (0..{MAX_MACRO_GRAMS})"
            )));
        }
    }
    Ok(())
}

/// Validate a client-supplied device fingerprint.
pub fn validate_device_id(device_id: &str) -> Result<(), ApiError> {
    if device_id.is_empty() {
        return Err(ApiError::BadRequest("deviceId is required".into()));
    }
    if device_id.len() > MAX_DEVICE_ID_LEN {
        return Err(ApiError::BadRequest(format!(
            "deviceId too long (max {MAX_DEVICE_ID_LEN} chars)"
        )));
    }
    if !device_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ApiError::BadRequest(
            "deviceId contains invalid characters".into(),
        ));
    }
    Ok(())
}

/// Parse an ISO `YYYY-MM-DD` date parameter.
pub fn parse_date(value: &str, field_name: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("{field_name} must be YYYY-MM-DD")))
}

// ============================================================================
// Request Context
// ============================================================================

/// Resolve the caller's IP: forwarded headers first, then the socket peer.
pub fn client_ip(headers: &HeaderMap, addr: SocketAddr) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return forwarded.to_string();
    }

    if let Some(real_ip) = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
    {
        return real_ip.to_string();
    }

    addr.ip().to_string()
}

/// Extract the user agent header, if present.
pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

// ============================================================================
// Metrics Helpers
// ============================================================================

/// Record operation duration with result label.
///
/// Labels: operation, result (ok/err)
#[inline]
pub fn record_op_duration(operation: &'static str, start: Instant, success: bool) {
    let result = if success { "ok" } else { "err" };
    metrics::histogram!(
        "nutrition_operation_duration_seconds",
        "operation" => operation,
        "result" => result
    )
    .record(start.elapsed().as_secs_f64());
}

// ============================================================================
// Tests
// ============================================================================
