//! Nutriq Auth - Identity source client
//!
//! Resolves bearer tokens against the hosted authentication provider.
//! The provider owns signup, login, and email confirmation; this crate
//! only answers "who is the caller" for a given token.

pub mod client;
pub mod error;

pub use client::*;
pub use error::*;
