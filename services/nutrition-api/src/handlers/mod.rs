//! REST API handlers

pub mod analyze;
pub mod health;
pub mod meals;
pub mod profile;
pub mod referrals;
pub mod shared;
pub mod trial;

pub use analyze::*;
pub use health::*;
pub use meals::*;
pub use profile::*;
pub use referrals::*;
pub use trial::*;
