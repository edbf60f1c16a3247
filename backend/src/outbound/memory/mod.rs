//! Process-local adapters used when no database is configured, and by the
//! behaviour tests.

mod feedback_store;
mod user_store;

pub use feedback_store::InMemoryFeedbackRepository;
pub use user_store::{InMemoryUserRepository, UserSeedError};
