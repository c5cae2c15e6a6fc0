//! Nutriq Trial Core - Trial and referral business logic
//!
//! The trial/referral state engine: pure trial evaluation, referral unlock
//! coordination, and device/IP fraud gating, composed into a `TrialService`
//! generic over the repository traits.

pub mod error;
pub mod evaluator;
pub mod fraud;
pub mod referral;
pub mod service;

pub use error::*;
pub use evaluator::*;
pub use fraud::*;
pub use referral::*;
pub use service::*;
