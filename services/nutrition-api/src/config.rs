//! Configuration for the Nutrition API service.

use nutriq_analysis::AnalysisConfig;
use nutriq_auth::AuthConfig;
use std::time::Duration;

/// Nutrition API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// Database URL
    pub database_url: String,

    /// Identity provider client configuration
    pub auth: AuthConfig,

    /// Classification service client configuration
    pub analysis: AnalysisConfig,

    /// Public origin used when building invite links
    pub app_origin: String,

    /// Request timeout for API routes
    pub request_timeout: Duration,

    /// Metrics enabled
    pub metrics_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Database
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        // Server port
        let http_port = std::env::var("HTTP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("HTTP_PORT"))?;

        // Identity provider
        let auth_base_url =
            std::env::var("AUTH_BASE_URL").map_err(|_| ConfigError::Missing("AUTH_BASE_URL"))?;

        let auth_api_key =
            std::env::var("AUTH_API_KEY").map_err(|_| ConfigError::Missing("AUTH_API_KEY"))?;

        let auth_cache_ttl_secs: u64 = std::env::var("AUTH_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("AUTH_CACHE_TTL_SECS"))?;

        // Classification service
        let analysis_url = std::env::var("FOOD_ANALYSIS_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000/analyze-food".to_string());

        let analysis_timeout_secs: u64 = std::env::var("ANALYSIS_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("ANALYSIS_TIMEOUT_SECS"))?;

        // Invite link origin
        let app_origin = std::env::var("APP_ORIGIN")
            .unwrap_or_else(|_| "https://app.nutriq.io".to_string());

        // Request timeout (default 30 seconds)
        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("REQUEST_TIMEOUT_SECS"))?;

        // Metrics
        let metrics_enabled = std::env::var("METRICS_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        let auth = AuthConfig::new(&auth_base_url, &auth_api_key)
            .with_cache_ttl(Duration::from_secs(auth_cache_ttl_secs));

        let analysis = AnalysisConfig::new(&analysis_url)
            .with_timeout(Duration::from_secs(analysis_timeout_secs));

        Ok(Self {
            http_port,
            database_url,
            auth,
            analysis,
            app_origin,
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
        })
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
