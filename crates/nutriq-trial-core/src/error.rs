//! Trial and referral errors

use thiserror::Error;

/// Trial engine errors
#[derive(Error, Debug)]
pub enum TrialError {
    /// No trial record exists for the user
    #[error("trial not found")]
    TrialNotFound,

    /// Referral code has no owner (or is the caller's own code)
    #[error("referral code not found")]
    CodeNotFound,

    /// The referred user already has a referral edge
    #[error("user already referred")]
    DuplicateReferral,

    /// An active trial lock on this IP belongs to another account
    #[error("trial already granted from this IP address")]
    FraudLock,

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl TrialError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::TrialNotFound | Self::CodeNotFound => 404,
            Self::DuplicateReferral => 409,
            Self::FraudLock => 403,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TrialNotFound => "TRIAL_NOT_FOUND",
            Self::CodeNotFound => "REFERRAL_CODE_NOT_FOUND",
            Self::DuplicateReferral => "DUPLICATE_REFERRAL",
            Self::FraudLock => "TRIAL_ALREADY_GRANTED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<nutriq_db::DbError> for TrialError {
    fn from(err: nutriq_db::DbError) -> Self {
        tracing::error!("Database error: {}", err);
        Self::Database(err.to_string())
    }
}
