//! Analysis errors

use thiserror::Error;

/// Classification service errors
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The service did not answer within the time budget
    #[error("analysis request timed out")]
    Timeout,

    /// The service answered with a non-success status
    #[error("analysis service returned status {0}")]
    UpstreamStatus(u16),

    /// The service answered with a payload that does not match the contract
    #[error("invalid analysis response: {0}")]
    InvalidResponse(String),

    /// Transport-level failure (DNS, connection reset, TLS)
    #[error("analysis request failed: {0}")]
    Transport(String),
}

impl AnalysisError {
    /// Whether the caller may retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Transport(_)) ||
            matches!(self, Self::UpstreamStatus(status) if *status >= 500)
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Timeout => 504,
            Self::UpstreamStatus(_) | Self::InvalidResponse(_) | Self::Transport(_) => 502,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Timeout => "UPSTREAM_TIMEOUT",
            Self::InvalidResponse(_) => "UPSTREAM_FORMAT",
            Self::UpstreamStatus(_) | Self::Transport(_) => "UPSTREAM_ERROR",
        }
    }
}
