//! Integration tests for the classification client against a mock service

use std::time::Duration;

use nutriq_analysis::{AnalysisClient, AnalysisConfig, AnalysisError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, timeout: Duration) -> AnalysisClient {
    let config =
        AnalysisConfig::new(format!("{}/analyze-food", server.uri())).with_timeout(timeout);
    AnalysisClient::new(config).expect("client builds")
}

const IMAGE: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

#[tokio::test]
async fn test_analyze_returns_validated_result() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/analyze-food"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "foods": [
                {"name": "salad", "confidence": 0.88, "estimated_calories": 150.0},
            ],
            "total_calories": 150.0,
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let analysis = client
        .analyze("meal.jpg", "image/jpeg", IMAGE.to_vec())
        .await
        .unwrap();

    assert_eq!(analysis.foods.len(), 1);
    assert_eq!(analysis.foods[0].name, "salad");
    assert_eq!(analysis.total_calories, 150.0);
}

#[tokio::test]
async fn test_slow_backend_maps_to_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/analyze-food"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"foods": [], "total_calories": 0.0}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_millis(200));
    let result = client.analyze("meal.jpg", "image/jpeg", IMAGE.to_vec()).await;

    // Timeout must be its own error, not a generic failure.
    assert!(matches!(result, Err(AnalysisError::Timeout)));
}

#[tokio::test]
async fn test_backend_error_status_surfaces() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/analyze-food"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let result = client.analyze("meal.jpg", "image/jpeg", IMAGE.to_vec()).await;

    match result {
        Err(AnalysisError::UpstreamStatus(status)) => {
            assert_eq!(status, 503);
        }
        other => panic!("expected UpstreamStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_payload_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/analyze-food"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [],
            "calories": 100,
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let result = client.analyze("meal.jpg", "image/jpeg", IMAGE.to_vec()).await;

    assert!(matches!(result, Err(AnalysisError::InvalidResponse(_))));
}

#[test]
fn test_retryable_classification() {
    assert!(AnalysisError::Timeout.is_retryable());
    assert!(AnalysisError::UpstreamStatus(503).is_retryable());
    assert!(!AnalysisError::UpstreamStatus(422).is_retryable());
    assert!(!AnalysisError::InvalidResponse("bad".to_string()).is_retryable());
}
