//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod feedback_command;
mod feedback_query;
mod feedback_repository;
mod login_service;
mod password_verifier;
mod principal_resolver;
mod token_codec;
mod user_repository;

#[cfg(test)]
pub use feedback_command::MockFeedbackCommand;
pub use feedback_command::{FeedbackCommand, SubmitFeedbackRequest};
#[cfg(test)]
pub use feedback_query::MockFeedbackQuery;
pub use feedback_query::FeedbackQuery;
#[cfg(test)]
pub use feedback_repository::MockFeedbackRepository;
pub use feedback_repository::{FeedbackRepository, FeedbackRepositoryError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{LoginOutcome, LoginService};
#[cfg(test)]
pub use password_verifier::MockPasswordVerifier;
pub use password_verifier::{PasswordVerifier, PasswordVerifierError};
#[cfg(test)]
pub use principal_resolver::MockPrincipalResolver;
pub use principal_resolver::PrincipalResolver;
#[cfg(test)]
pub use token_codec::MockTokenCodec;
pub use token_codec::{IssuedToken, TokenCodec, TokenCodecError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
