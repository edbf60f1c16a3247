//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the feedback and user repository ports backed
//! by PostgreSQL via `diesel-async` with `bb8` connection pooling.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types; validation reuses the domain constructors.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Per-row serialization**: mutations lock the affected feedback row for
//!   the duration of their transaction.
//!
//! # Example
//!
//! ```no_run
//! use feedback_board::outbound::persistence::{
//!     DbPool, DieselFeedbackRepository, PoolConfig, apply_migrations,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let url = "postgres://localhost/feedback";
//! apply_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let repo = DieselFeedbackRepository::new(pool);
//! # let _ = repo;
//! # Ok(())
//! # }
//! ```

mod diesel_feedback_repository;
mod diesel_user_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_feedback_repository::DieselFeedbackRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, apply_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
