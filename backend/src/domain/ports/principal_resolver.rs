//! Driving port that turns a presented credential into a principal.

use async_trait::async_trait;

use crate::domain::{BearerToken, Error, Principal};

/// Resolves the caller's identity for one request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    /// Absent credential yields [`Principal::Anonymous`]. A credential that
    /// fails verification is `invalid_credential`; one naming a vanished
    /// user is `principal_not_found`.
    async fn resolve(&self, token: Option<BearerToken>) -> Result<Principal, Error>;
}

