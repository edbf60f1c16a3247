//! Credential login service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    LoginOutcome, LoginService, PasswordVerifier, TokenCodec, UserPersistenceError,
    UserRepository,
};
use crate::domain::{Error, LoginCredentials};

const REJECTED: &str = "invalid email or password";

/// Login service that checks a password against the user store and issues
/// a signed token.
#[derive(Clone)]
pub struct CredentialLoginService<U, P, T> {
    user_repo: Arc<U>,
    passwords: Arc<P>,
    tokens: Arc<T>,
}

impl<U, P, T> CredentialLoginService<U, P, T> {
    pub fn new(user_repo: Arc<U>, passwords: Arc<P>, tokens: Arc<T>) -> Self {
        Self {
            user_repo,
            passwords,
            tokens,
        }
    }
}

#[async_trait]
impl<U, P, T> LoginService for CredentialLoginService<U, P, T>
where
    U: UserRepository,
    P: PasswordVerifier,
    T: TokenCodec,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginOutcome, Error> {
        let user = self
            .user_repo
            .find_by_email(credentials.email())
            .await
            .map_err(|err| match err {
                UserPersistenceError::Connection { message } => {
                    Error::service_unavailable(format!("user repository unavailable: {message}"))
                }
                other => Error::internal(format!("user repository error: {other}")),
            })?;

        let Some(user) = user else {
            warn!("login attempt for unknown email");
            return Err(Error::invalid_credential(REJECTED));
        };

        let matches = self
            .passwords
            .verify(credentials.password(), user.credential_hash())
            .map_err(|err| Error::internal(err.to_string()))?;
        if !matches {
            warn!(user = %user.id(), "login attempt with wrong password");
            return Err(Error::invalid_credential(REJECTED));
        }

        let issued = self
            .tokens
            .issue(user.id())
            .map_err(|err| Error::internal(err.to_string()))?;
        info!(user = %user.id(), "user logged in");

        Ok(LoginOutcome {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{
        IssuedToken, MockPasswordVerifier, MockTokenCodec, MockUserRepository,
        PasswordVerifierError,
    };
    use crate::domain::{
        BearerToken, CredentialHash, DisplayName, EmailAddress, ErrorCode, User, UserId,
        UserParts,
    };
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    #[fixture]
    fn ada() -> User {
        User::new(UserParts {
            id: UserId::random(),
            display_name: DisplayName::new("Ada Lovelace").expect("name"),
            email: EmailAddress::new("ada@example.com").expect("email"),
            credential_hash: CredentialHash::new("sha256$00$11").expect("hash"),
            is_admin: false,
        })
    }

    fn creds(password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(" ADA@example.com ", password).expect("credentials")
    }

    fn service(
        users: MockUserRepository,
        passwords: MockPasswordVerifier,
        tokens: MockTokenCodec,
    ) -> CredentialLoginService<MockUserRepository, MockPasswordVerifier, MockTokenCodec> {
        CredentialLoginService::new(Arc::new(users), Arc::new(passwords), Arc::new(tokens))
    }

    #[rstest]
    #[tokio::test]
    async fn valid_credentials_issue_a_token(ada: User) {
        let expires_at = Utc
            .with_ymd_and_hms(2025, 3, 8, 9, 0, 0)
            .single()
            .expect("valid timestamp");
        let expected_user = ada.clone();

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .withf(|email| email.as_ref() == "ada@example.com")
            .return_once(move |_| Ok(Some(ada)));
        let mut passwords = MockPasswordVerifier::new();
        passwords
            .expect_verify()
            .withf(|password, _| password == "secret")
            .return_once(|_, _| Ok(true));
        let mut tokens = MockTokenCodec::new();
        tokens.expect_issue().return_once(move |_| {
            Ok(IssuedToken {
                token: BearerToken::new("signed"),
                expires_at,
            })
        });

        let outcome = service(users, passwords, tokens)
            .login(&creds("secret"))
            .await
            .expect("login succeeds");
        assert_eq!(outcome.token.expose(), "signed");
        assert_eq!(outcome.expires_at, expires_at);
        assert_eq!(outcome.user, expected_user);
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_email_and_wrong_password_fail_identically(ada: User) {
        let mut unknown_users = MockUserRepository::new();
        unknown_users
            .expect_find_by_email()
            .return_once(|_| Ok(None));
        let unknown = service(unknown_users, MockPasswordVerifier::new(), MockTokenCodec::new())
            .login(&creds("secret"))
            .await
            .expect_err("unknown email");

        let mut users = MockUserRepository::new();
        users.expect_find_by_email().return_once(move |_| Ok(Some(ada)));
        let mut passwords = MockPasswordVerifier::new();
        passwords.expect_verify().return_once(|_, _| Ok(false));
        let wrong = service(users, passwords, MockTokenCodec::new())
            .login(&creds("wrong"))
            .await
            .expect_err("wrong password");

        assert_eq!(unknown.code(), ErrorCode::InvalidCredential);
        assert_eq!(wrong.code(), ErrorCode::InvalidCredential);
        assert_eq!(unknown.message(), wrong.message());
    }

    #[rstest]
    #[tokio::test]
    async fn unusable_hash_is_internal(ada: User) {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().return_once(move |_| Ok(Some(ada)));
        let mut passwords = MockPasswordVerifier::new();
        passwords
            .expect_verify()
            .return_once(|_, _| Err(PasswordVerifierError::unsupported_hash("bcrypt")));

        let err = service(users, passwords, MockTokenCodec::new())
            .login(&creds("secret"))
            .await
            .expect_err("bad hash");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
