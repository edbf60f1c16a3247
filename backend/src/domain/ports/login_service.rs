//! Driving port for login/authentication use-cases.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! exchange credentials for a bearer token without knowing the backing user
//! store or token scheme.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{BearerToken, Error, LoginCredentials, User};

/// Successful login: the issued token and the user it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub token: BearerToken,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and issue a token.
    ///
    /// Unknown emails and wrong passwords fail identically with
    /// `invalid_credential`.
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error>;
}
