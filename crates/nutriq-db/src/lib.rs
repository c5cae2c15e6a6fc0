//! Nutriq DB - Database abstractions
//!
//! SQLx-based database layer for Nutriq services.
//!
//! # Example
//!
//! ```rust,ignore
//! use nutriq_db::{create_pool, Repositories};
//!
//! let pool = create_pool("postgres://localhost/nutriq").await?;
//! let repos = Repositories::new(pool);
//!
//! // Use repositories
//! let trial = repos.trials.find_by_user_id(user_id).await?;
//! ```

pub mod error;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool, DbPool};
pub use repo::*;
