//! Caller identification for HTTP handlers.
//!
//! The presented credential is read from `Authorization: Bearer <token>`,
//! falling back to the `authToken` cookie. Resolution to a [`Principal`] is
//! delegated to the [`PrincipalResolver`](crate::domain::ports::PrincipalResolver)
//! port held in [`HttpState`].

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{BearerToken, Error, Principal};
use crate::inbound::http::state::HttpState;

/// Name of the cookie carrying the bearer token.
pub const AUTH_COOKIE: &str = "authToken";

const BEARER_SCHEME: &str = "bearer";

/// Extract the presented bearer token, if any.
///
/// A header that is present but not a non-empty bearer credential is
/// rejected rather than ignored.
pub fn presented_token(req: &HttpRequest) -> Result<Option<BearerToken>, Error> {
    if let Some(header) = req.headers().get(AUTHORIZATION) {
        let value = header
            .to_str()
            .map_err(|_| Error::invalid_credential("authorization header is not valid text"))?;
        let (scheme, token) = value
            .trim()
            .split_once(' ')
            .ok_or_else(|| Error::invalid_credential("authorization header must be Bearer"))?;
        let token = token.trim();
        if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) || token.is_empty() {
            return Err(Error::invalid_credential("authorization header must be Bearer"));
        }
        return Ok(Some(BearerToken::new(token)));
    }

    Ok(req
        .cookie(AUTH_COOKIE)
        .map(|cookie| cookie.value().trim().to_owned())
        .filter(|value| !value.is_empty())
        .map(BearerToken::new))
}

/// The resolved caller for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(pub Principal);

impl Caller {
    pub fn principal(&self) -> &Principal {
        &self.0
    }
}

impl FromRequest for Caller {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = presented_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            let principal = state.principals.resolve(token?).await?;
            Ok(Caller(principal))
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    fn token_of(req: &HttpRequest) -> Option<String> {
        presented_token(req)
            .expect("token extraction")
            .map(|token| token.expose().to_owned())
    }

    #[rstest]
    fn no_credential_is_none() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(token_of(&req), None);
    }

    #[rstest]
    #[case("Bearer abc.def")]
    #[case("bearer abc.def")]
    #[case("  Bearer   abc.def  ")]
    fn bearer_header_is_read(#[case] header: &str) {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, header))
            .to_http_request();
        assert_eq!(token_of(&req).as_deref(), Some("abc.def"));
    }

    #[rstest]
    fn cookie_is_the_fallback() {
        let req = TestRequest::default()
            .cookie(Cookie::new(AUTH_COOKIE, "from-cookie"))
            .to_http_request();
        assert_eq!(token_of(&req).as_deref(), Some("from-cookie"));
    }

    #[rstest]
    fn header_wins_over_cookie() {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer from-header"))
            .cookie(Cookie::new(AUTH_COOKIE, "from-cookie"))
            .to_http_request();
        assert_eq!(token_of(&req).as_deref(), Some("from-header"));
    }

    #[rstest]
    #[case("Basic dXNlcjpwdw==")]
    #[case("Bearer")]
    #[case("Bearer    ")]
    fn non_bearer_headers_are_invalid(#[case] header: &str) {
        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, header))
            .to_http_request();
        let err = presented_token(&req).expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::InvalidCredential);
    }
}
