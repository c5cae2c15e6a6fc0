//! Food photo analysis handler

use axum::extract::{Multipart, State};
use axum::Json;
use std::time::Instant;

use nutriq_analysis::FoodAnalysis;

use crate::error::{ApiError, ApiResult};
use crate::extractors::AuthUser;
use crate::handlers::shared::record_op_duration;
use crate::state::AppState;

/// POST /api/v1/analyze-food
///
/// Proxy one meal photo to the classification service. Timeouts and
/// malformed upstream payloads surface as their own error codes so the
/// client can offer retry or manual entry; calorie values are never
/// silently defaulted.
pub async fn analyze_food(
    State(state): State<AppState>,
    auth_user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<FoodAnalysis>> {
    let start = Instant::now();

    let mut file: Option<(String, String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload.jpg").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {e}")))?;
            file = Some((filename, content_type, bytes.to_vec()));
            break;
        }
    }

    let Some((filename, content_type, bytes)) = file else {
        return Err(ApiError::BadRequest("No file provided".into()));
    };

    if bytes.is_empty() {
        return Err(ApiError::BadRequest("Empty file".into()));
    }

    tracing::debug!(
        user_id = %auth_user.user_id,
        filename = %filename,
        size = bytes.len(),
        "Forwarding image to analysis service"
    );

    let analysis = state.analysis.analyze(&filename, &content_type, bytes).await;
    record_op_duration("analyze_food", start, analysis.is_ok());

    match &analysis {
        Ok(result) => {
            metrics::counter!("analysis_requests_total", "result" => "ok").increment(1);
            tracing::info!(
                user_id = %auth_user.user_id,
                total_calories = result.total_calories,
                "Meal analyzed"
            );
        }
        Err(e) => {
            metrics::counter!("analysis_requests_total", "result" => e.error_code()).increment(1);
        }
    }

    Ok(Json(analysis?))
}
