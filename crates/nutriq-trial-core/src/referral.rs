//! Referral unlock coordination
//!
//! Records referral edges, verifies them when the referred user confirms
//! their account, and extends the referrer's trial once enough verified
//! referrals accumulate.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use moka::future::Cache;
use tracing::{debug, info};
use uuid::Uuid;

use nutriq_db::{CreateReferral, ReferralRepository, TrialRepository};
use nutriq_types::{Referral, UserId, VerificationMethod};

use crate::TrialError;

/// Verified referrals needed to unlock the extension
pub const REFERRALS_REQUIRED: i64 = 3;

/// Days granted by the referral unlock
pub const REFERRAL_UNLOCK_DAYS: i64 = 30;

/// Length of generated referral codes
const CODE_LEN: usize = 8;

/// Code alphabet; ambiguous characters (0/O, 1/I) are left out
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// How many code-collision retries before giving up
const CODE_RETRIES: usize = 4;

/// Outcome of applying a referral code
#[derive(Debug, Clone)]
pub struct AppliedReferral {
    /// The recorded (unverified) edge
    pub referral: Referral,
}

/// A referral unlock granted to a referrer
#[derive(Debug, Clone)]
pub struct ReferralUnlock {
    /// Referrer whose trial was extended
    pub referrer_id: UserId,
    /// New trial end date
    pub trial_end_date: DateTime<Utc>,
}

/// Outcome of a verification event
#[derive(Debug, Clone, Default)]
pub struct ConfirmOutcome {
    /// Whether this event flipped an edge to verified
    pub verified_now: bool,
    /// Unlock granted to the referrer, if the threshold was crossed
    pub unlock: Option<ReferralUnlock>,
}

/// Referral progress for one user
#[derive(Debug, Clone)]
pub struct ReferralSummary {
    /// The user's code, if one has been minted
    pub code: Option<String>,
    /// Verified edge count
    pub verified: i64,
    /// Edges still awaiting verification
    pub pending: i64,
    /// Threshold for the unlock
    pub required: i64,
    /// All edges, newest verification first
    pub referrals: Vec<Referral>,
}

/// Referral unlock coordinator
///
/// Codes are immutable once minted, so the user -> code mapping is safe to
/// cache. Trial state is never cached here.
#[derive(Clone)]
pub struct ReferralCoordinator<T: TrialRepository, R: ReferralRepository> {
    trials: Arc<T>,
    referrals: Arc<R>,
    /// Cache of user_id -> referral code
    code_cache: Cache<Uuid, String>,
}

impl<T: TrialRepository, R: ReferralRepository> ReferralCoordinator<T, R> {
    /// Create a new coordinator
    pub fn new(trials: Arc<T>, referrals: Arc<R>) -> Self {
        Self {
            trials,
            referrals,
            code_cache: Cache::builder().max_capacity(10_000).build(),
        }
    }

    /// Get or mint the user's referral code
    pub async fn ensure_code(&self, user_id: UserId) -> Result<String, TrialError> {
        if let Some(code) = self.code_cache.get(&user_id.0).await {
            return Ok(code);
        }

        if let Some(row) = self.referrals.find_code_by_user_id(user_id.0).await? {
            self.code_cache.insert(user_id.0, row.code.clone()).await;
            return Ok(row.code);
        }

        // Codes are random; a collision with another user's code is
        // possible and surfaces as a unique violation, so retry.
        for _ in 0..CODE_RETRIES {
            let code = generate_code();
            match self.referrals.create_code(user_id.0, &code).await {
                Ok(row) => {
                    self.code_cache.insert(user_id.0, row.code.clone()).await;
                    return Ok(row.code);
                }
                Err(e) if e.is_unique_violation() => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(TrialError::Internal(
            "could not mint a unique referral code".to_string(),
        ))
    }

    /// Apply a referral code for a newly signed-up user
    ///
    /// Records the unverified edge. The unique index on the referred user
    /// makes the duplicate check atomic; redeeming a nonexistent code or
    /// your own code fails with `CodeNotFound`. Callers must treat every
    /// failure here as non-fatal for signup.
    pub async fn apply_referral(
        &self,
        new_user_id: UserId,
        new_user_email: Option<String>,
        code: &str,
        _now: DateTime<Utc>,
    ) -> Result<AppliedReferral, TrialError> {
        let owner = self
            .referrals
            .find_code_owner(code)
            .await?
            .ok_or(TrialError::CodeNotFound)?;

        if owner.user_id == new_user_id.0 {
            debug!(user_id = %new_user_id, "Self-referral attempt rejected");
            return Err(TrialError::CodeNotFound);
        }

        let create = CreateReferral {
            id: Uuid::new_v4(),
            referrer_id: owner.user_id,
            referred_user_id: new_user_id.0,
            referral_code: code.to_string(),
            referred_email: new_user_email,
        };

        let row = match self.referrals.create_referral(create).await {
            Ok(row) => row,
            Err(e) if e.is_unique_violation() => return Err(TrialError::DuplicateReferral),
            Err(e) => return Err(e.into()),
        };

        info!(
            referrer = %row.referrer_id,
            referred = %new_user_id,
            "Referral edge recorded"
        );

        Ok(AppliedReferral {
            referral: row.to_referral(),
        })
    }

    /// Handle the referred user's verification event
    ///
    /// Flips their edge to verified and re-tallies the referrer. Reports
    /// whether an edge flipped and whether the referrer crossed the
    /// threshold; calling again for an already-verified user is a no-op.
    pub async fn confirm_referral(
        &self,
        referred_user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<ConfirmOutcome, TrialError> {
        let method = VerificationMethod::Email.to_string();
        let Some(edge) = self
            .referrals
            .mark_verified(referred_user_id.0, &method, now)
            .await?
        else {
            // No edge, or already verified.
            return Ok(ConfirmOutcome::default());
        };

        let referrer_id = UserId(edge.referrer_id);
        let unlock = self.tally_and_unlock(referrer_id, now).await?;

        Ok(ConfirmOutcome {
            verified_now: true,
            unlock,
        })
    }

    /// Re-tally a referrer and extend their trial if the threshold holds
    ///
    /// The extension UPDATE is conditioned on the unlock flag at the store
    /// layer, so repeated tallies at or above the threshold extend once.
    async fn tally_and_unlock(
        &self,
        referrer_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Option<ReferralUnlock>, TrialError> {
        let verified = self.referrals.count_verified(referrer_id.0).await?;
        if verified < REFERRALS_REQUIRED {
            return Ok(None);
        }

        let new_end = now + Duration::days(REFERRAL_UNLOCK_DAYS);
        let changed = self
            .trials
            .extend_for_referral(referrer_id.0, new_end, REFERRAL_UNLOCK_DAYS as i32, now)
            .await?;

        if changed == 0 {
            // Already unlocked.
            return Ok(None);
        }

        info!(
            referrer = %referrer_id,
            verified,
            "Referral threshold reached, trial extended"
        );

        Ok(Some(ReferralUnlock {
            referrer_id,
            trial_end_date: new_end,
        }))
    }

    /// Referral progress for a user
    pub async fn summary(&self, user_id: UserId) -> Result<ReferralSummary, TrialError> {
        let code = self
            .referrals
            .find_code_by_user_id(user_id.0)
            .await?
            .map(|row| row.code);

        let rows = self.referrals.find_by_referrer(user_id.0).await?;
        let verified = rows.iter().filter(|r| r.is_verified).count() as i64;
        let pending = rows.len() as i64 - verified;

        Ok(ReferralSummary {
            code,
            verified,
            pending,
            required: REFERRALS_REQUIRED,
            referrals: rows.iter().map(|r| r.to_referral()).collect(),
        })
    }
}

impl<T: TrialRepository, R: ReferralRepository> std::fmt::Debug for ReferralCoordinator<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferralCoordinator").finish()
    }
}

/// Generate a random referral code
fn generate_code() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}
