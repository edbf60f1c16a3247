//! Port for checking a password against a stored credential hash.

use crate::domain::CredentialHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised while checking a password.
    pub enum PasswordVerifierError {
        /// The stored hash is not in a format the verifier understands.
        UnsupportedHash { message: String } => "stored credential hash is unusable: {message}",
    }
}

/// Checks passwords against stored hashes. The hashing scheme belongs to the
/// adapter.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordVerifier: Send + Sync {
    /// Return `Ok(true)` when `password` matches `hash`.
    fn verify(&self, password: &str, hash: &CredentialHash) -> Result<bool, PasswordVerifierError>;
}
