//! Referral types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::UserId;

/// A user's immutable referral code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralCode {
    /// Owning user
    pub user_id: UserId,
    /// Opaque URL-safe code handed out in invite links
    pub code: String,
    /// When the code was minted
    pub created_at: DateTime<Utc>,
}

/// Unique referral edge identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferralId(pub Uuid);

/// How a referral edge was verified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    /// Referred user confirmed their email address
    Email,
}

impl std::fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Email => write!(f, "email"),
        }
    }
}

impl std::str::FromStr for VerificationMethod {
    type Err = VerificationMethodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Self::Email),
            _ => Err(VerificationMethodParseError(s.to_string())),
        }
    }
}

/// Error parsing a verification method string
#[derive(Debug, Clone)]
pub struct VerificationMethodParseError(pub String);

impl std::fmt::Display for VerificationMethodParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid verification method: {}", self.0)
    }
}

impl std::error::Error for VerificationMethodParseError {}

/// A recorded referrer -> referred relationship
///
/// At most one edge exists per referred user; the store enforces this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referral {
    /// Edge ID
    pub id: ReferralId,
    /// User whose code was redeemed
    pub referrer_id: UserId,
    /// User who signed up with the code
    pub referred_user_id: UserId,
    /// The code that was redeemed
    pub referral_code: String,
    /// Email the referred user signed up with
    pub referred_email: Option<String>,
    /// Whether the referred user completed verification
    pub is_verified: bool,
    /// How verification happened, once it did
    pub verification_method: Option<VerificationMethod>,
    /// When verification happened
    pub verified_at: Option<DateTime<Utc>>,
    /// When the edge was created
    pub created_at: DateTime<Utc>,
}

/// Build the invite link for a referral code
///
/// Format: `<origin>/auth/sign-up?ref=<code>`
pub fn referral_link(origin: &str, code: &str) -> String {
    format!("{}/auth/sign-up?ref={}", origin.trim_end_matches('/'), code)
}
