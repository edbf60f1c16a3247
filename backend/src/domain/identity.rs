//! Identity resolution: bearer token to principal.
//!
//! The admin flag always comes from the user store at resolution time, so a
//! revoked administrator loses authority on their next request even while
//! holding a valid token.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::ports::{
    PrincipalResolver, TokenCodec, TokenCodecError, UserPersistenceError, UserRepository,
};
use crate::domain::{BearerToken, Error, Principal};

/// Resolver backed by a token codec and the user store.
#[derive(Clone)]
pub struct TokenPrincipalResolver<T, U> {
    tokens: Arc<T>,
    user_repo: Arc<U>,
}

impl<T, U> TokenPrincipalResolver<T, U> {
    pub fn new(tokens: Arc<T>, user_repo: Arc<U>) -> Self {
        Self { tokens, user_repo }
    }
}

#[async_trait]
impl<T, U> PrincipalResolver for TokenPrincipalResolver<T, U>
where
    T: TokenCodec,
    U: UserRepository,
{
    async fn resolve(&self, token: Option<BearerToken>) -> Result<Principal, Error> {
        let Some(token) = token else {
            return Ok(Principal::Anonymous);
        };

        let claims = self.tokens.verify(&token).map_err(|err| {
            warn!(reason = %err, "rejected bearer token");
            match err {
                TokenCodecError::Expired => Error::invalid_credential("credential has expired"),
                _ => Error::invalid_credential("credential is invalid"),
            }
        })?;

        let user = self
            .user_repo
            .find_by_id(&claims.subject)
            .await
            .map_err(|err| match err {
                UserPersistenceError::Connection { message } => {
                    Error::service_unavailable(format!("user repository unavailable: {message}"))
                }
                other => Error::internal(format!("user repository error: {other}")),
            })?
            .ok_or_else(|| {
                warn!(user = %claims.subject, "token names an unknown user");
                Error::principal_not_found("the user for this credential no longer exists")
            })?;

        Ok(Principal::user(user.id().clone(), user.is_admin()))
    }
}
