//! Login handler.
//!
//! ```text
//! POST /api/v1/login {"email":"ada@example.com","password":"secret"}
//! ```

use actix_web::cookie::time::OffsetDateTime;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::LoginOutcome;
use crate::domain::{Error, LoginCredentials, LoginValidationError, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AUTH_COOKIE;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::{AuthCookiePolicy, HttpState};

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

/// Public view of the signed-in user.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub is_admin: bool,
}

impl From<&User> for UserBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            display_name: user.display_name().to_string(),
            email: user.email().to_string(),
            is_admin: user.is_admin(),
        }
    }
}

/// Successful login payload.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[schema(format = "date-time")]
    pub expires_at: String,
    pub user: UserBody,
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::Email(inner) => Error::validation(inner.to_string())
            .with_details(json!({ "field": "email", "code": "invalid_email" })),
        LoginValidationError::EmptyPassword => Error::validation("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

fn auth_cookie(outcome: &LoginOutcome, policy: AuthCookiePolicy) -> Result<Cookie<'static>, Error> {
    let expires = OffsetDateTime::from_unix_timestamp(outcome.expires_at.timestamp())
        .map_err(|err| Error::internal(format!("token expiry out of range: {err}")))?;
    Ok(Cookie::build(AUTH_COOKIE, outcome.token.expose().to_owned())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(policy.secure)
        .expires(expires)
        .finish())
}

/// Exchange email and password for a bearer token.
///
/// The token is returned in the body and also set as the `authToken`
/// cookie so browser clients need no extra handling.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse,
            headers(("Set-Cookie" = String, description = "authToken cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let outcome = state.login.login(&credentials).await?;
    let cookie = auth_cookie(&outcome, state.auth_cookie)?;

    Ok(HttpResponse::Ok().cookie(cookie).json(LoginResponse {
        token: outcome.token.expose().to_owned(),
        expires_at: outcome.expires_at.to_rfc3339(),
        user: UserBody::from(&outcome.user),
    }))
}

#[cfg(test)]
mod tests;
