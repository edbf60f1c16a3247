//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **memory**: process-local repositories for database-free runs and tests
//! - **token**: HS256 JSON Web Tokens
//! - **credentials**: salted SHA-256 password verification
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod credentials;
pub mod memory;
pub mod persistence;
pub mod token;
