//! Nutriq Types - Shared domain types
//!
//! This crate contains domain types used across Nutriq services:
//! - User identity
//! - Trial subscription state
//! - Referral codes and edges
//! - Meals and nutrition totals

pub mod nutrition;
pub mod referral;
pub mod trial;
pub mod user;

pub use nutrition::*;
pub use referral::*;
pub use trial::*;
pub use user::*;
