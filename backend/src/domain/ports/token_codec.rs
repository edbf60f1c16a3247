//! Port for issuing and verifying bearer tokens.

use chrono::{DateTime, Utc};

use crate::domain::{BearerToken, TokenClaims, UserId};

use super::define_port_error;

define_port_error! {
    /// Reasons a token could not be issued or verified.
    pub enum TokenCodecError {
        /// The token is not in the expected shape.
        Malformed { message: String } => "token is malformed: {message}",
        /// The signature does not match the payload.
        BadSignature => "token signature is invalid",
        /// The token's expiry has passed.
        Expired => "token has expired",
        /// The token could not be produced.
        Issue { message: String } => "token could not be issued: {message}",
    }
}

/// A freshly issued token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: BearerToken,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies bearer tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenCodec: Send + Sync {
    /// Issue a token naming `subject`.
    fn issue(&self, subject: &UserId) -> Result<IssuedToken, TokenCodecError>;

    /// Verify a presented token and return its claims.
    fn verify(&self, token: &BearerToken) -> Result<TokenClaims, TokenCodecError>;
}
