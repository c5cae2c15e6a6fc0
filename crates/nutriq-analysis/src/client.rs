//! Classification service client

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::AnalysisError;

/// Default time budget for one classification request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Classification client configuration
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Full URL of the analyze endpoint
    pub endpoint: String,
    /// Per-request time budget
    pub request_timeout: Duration,
}

impl AnalysisConfig {
    /// Create a new config with the default time budget
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the time budget
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// One recognized food item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedFood {
    /// Food name
    pub name: String,
    /// Classifier confidence, 0 to 1
    pub confidence: f64,
    /// Estimated calories for the portion seen
    pub estimated_calories: f64,
}

/// Full classification result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodAnalysis {
    /// Recognized foods
    pub foods: Vec<AnalyzedFood>,
    /// Estimated calories for the whole plate
    pub total_calories: f64,
}

/// Classification service client
#[derive(Clone)]
pub struct AnalysisClient {
    client: Client,
    config: AnalysisConfig,
}

impl AnalysisClient {
    /// Create a new classification client
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Upload an image and get food/calorie estimates
    ///
    /// The request is bounded by the configured time budget; hitting it is
    /// reported as `Timeout`, never as a generic failure. The response is
    /// validated against the exact contract shape before being returned —
    /// calorie values are never defaulted.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn analyze(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<FoodAnalysis, AnalysisError> {
        debug!(filename = %filename, "Uploading image for analysis");

        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&self.config.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    warn!("Analysis request timed out");
                    AnalysisError::Timeout
                } else {
                    warn!(error = %e, "Analysis request failed");
                    AnalysisError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Analysis service error");
            return Err(AnalysisError::UpstreamStatus(status.as_u16()));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                AnalysisError::Timeout
            } else {
                AnalysisError::InvalidResponse(e.to_string())
            }
        })?;

        let analysis = validate_response(&body)?;
        debug!(total_calories = analysis.total_calories, "Analysis complete");

        Ok(analysis)
    }
}

impl std::fmt::Debug for AnalysisClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisClient")
            .field("endpoint", &self.config.endpoint)
            .finish_non_exhaustive()
    }
}

/// Validate the classifier payload against the contract shape
///
/// Anything other than `{foods: [{name, confidence, estimated_calories}],
/// total_calories}` with confidence in 0..=1 is rejected.
fn validate_response(body: &serde_json::Value) -> Result<FoodAnalysis, AnalysisError> {
    let foods = body
        .get("foods")
        .and_then(|f| f.as_array())
        .ok_or_else(|| AnalysisError::InvalidResponse("missing foods array".to_string()))?;

    let total_calories = body
        .get("total_calories")
        .and_then(serde_json::Value::as_f64)
        .ok_or_else(|| AnalysisError::InvalidResponse("missing total_calories".to_string()))?;

    let mut parsed = Vec::with_capacity(foods.len());
    for (i, food) in foods.iter().enumerate() {
        let name = food
            .get("name")
            .and_then(|n| n.as_str())
            .ok_or_else(|| AnalysisError::InvalidResponse(format!("foods[{i}]: missing name")))?;

        let confidence = food
            .get("confidence")
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| {
                AnalysisError::InvalidResponse(format!("foods[{i}]: missing confidence"))
            })?;

        if !(0.0..=1.0).contains(&confidence) {
            return Err(AnalysisError::InvalidResponse(format!(
                "foods[{i}]: confidence {confidence} out of range"
            )));
        }

        let estimated_calories = food
            .get("estimated_calories")
            .and_then(serde_json::Value::as_f64)
            .ok_or_else(|| {
                AnalysisError::InvalidResponse(format!("foods[{i}]: missing estimated_calories"))
            })?;

        parsed.push(AnalyzedFood {
            name: name.to_string(),
            confidence,
            estimated_calories,
        });
    }

    Ok(FoodAnalysis {
        foods: parsed,
        total_calories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_response_parses() {
        let body = json!({
            "foods": [
                {"name": "grilled chicken", "confidence": 0.92, "estimated_calories": 320.0},
                {"name": "rice", "confidence": 0.81, "estimated_calories": 210.0},
            ],
            "total_calories": 530.0,
        });

        let analysis = validate_response(&body).unwrap();
        assert_eq!(analysis.foods.len(), 2);
        assert_eq!(analysis.foods[0].name, "grilled chicken");
        assert_eq!(analysis.total_calories, 530.0);
    }

    #[test]
    fn test_empty_foods_is_valid() {
        let body = json!({"foods": [], "total_calories": 0.0});
        let analysis = validate_response(&body).unwrap();
        assert!(analysis.foods.is_empty());
    }

    #[test]
    fn test_missing_foods_rejected() {
        let body = json!({"total_calories": 530.0});
        assert!(matches!(
            validate_response(&body),
            Err(AnalysisError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_missing_total_calories_rejected() {
        let body = json!({"foods": []});
        assert!(matches!(
            validate_response(&body),
            Err(AnalysisError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_non_numeric_total_rejected() {
        let body = json!({"foods": [], "total_calories": "530"});
        assert!(matches!(
            validate_response(&body),
            Err(AnalysisError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_confidence_out_of_range_rejected() {
        let body = json!({
            "foods": [{"name": "pizza", "confidence": 1.5, "estimated_calories": 900.0}],
            "total_calories": 900.0,
        });
        assert!(matches!(
            validate_response(&body),
            Err(AnalysisError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_food_missing_field_rejected() {
        let body = json!({
            "foods": [{"name": "pizza", "confidence": 0.9}],
            "total_calories": 900.0,
        });
        let err = validate_response(&body).unwrap_err();
        assert!(err.to_string().contains("estimated_calories"));
    }
}
