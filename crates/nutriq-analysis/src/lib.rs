//! Nutriq Analysis - Food image classification client
//!
//! Client for the external image-classification service: uploads a meal
//! photo, enforces a hard time budget, and validates the response shape
//! before anything downstream sees it.

pub mod client;
pub mod error;

pub use client::*;
pub use error::*;
