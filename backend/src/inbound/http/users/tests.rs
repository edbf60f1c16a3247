//! Tests for the login handler.

use super::*;
use crate::domain::ports::MockLoginService;
use crate::domain::{
    BearerToken, CredentialHash, DisplayName, EmailAddress, ErrorCode, UserId, UserParts,
};
use crate::inbound::http::test_utils::TestPorts;
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use chrono::{TimeZone, Utc};
use rstest::rstest;
use serde_json::Value;
use std::sync::Arc;

fn ada() -> User {
    User::new(UserParts {
        id: UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("id"),
        display_name: DisplayName::new("Ada Lovelace").expect("name"),
        email: EmailAddress::new("ada@example.com").expect("email"),
        credential_hash: CredentialHash::new("sha256$00$11").expect("hash"),
        is_admin: false,
    })
}

fn login_request(email: &str, password: &str) -> actix_test::TestRequest {
    actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(&LoginRequest {
            email: email.into(),
            password: password.into(),
        })
}

macro_rules! init_app {
    ($login:expr) => {
        actix_test::init_service(
            App::new()
                .app_data(
                    TestPorts {
                        login: Arc::new($login),
                        ..TestPorts::default()
                    }
                    .into_state(),
                )
                .service(web::scope("/api/v1").service(login)),
        )
        .await
    };
}

#[rstest]
#[actix_web::test]
async fn successful_login_returns_token_and_sets_cookie() {
    let mut service = MockLoginService::new();
    service
        .expect_login()
        .withf(|credentials| {
            credentials.email().as_ref() == "ada@example.com" && credentials.password() == "secret"
        })
        .times(1)
        .returning(|_| {
            Ok(LoginOutcome {
                token: BearerToken::new("payload.signature"),
                expires_at: Utc
                    .with_ymd_and_hms(2025, 3, 8, 9, 0, 0)
                    .single()
                    .expect("timestamp"),
                user: ada(),
            })
        });
    let app = init_app!(service);

    let res = actix_test::call_service(&app, login_request(" Ada@Example.com ", "secret").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);

    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == AUTH_COOKIE)
        .expect("auth cookie")
        .into_owned();
    assert_eq!(cookie.value(), "payload.signature");
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.same_site(), Some(SameSite::Lax));

    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["token"], "payload.signature");
    assert_eq!(body["expiresAt"], "2025-03-08T09:00:00+00:00");
    assert_eq!(body["user"]["displayName"], "Ada Lovelace");
    assert_eq!(body["user"]["isAdmin"], false);
    assert!(body["user"].get("credentialHash").is_none());
}

#[rstest]
#[actix_web::test]
async fn rejected_credentials_are_unauthorised() {
    let mut service = MockLoginService::new();
    service
        .expect_login()
        .returning(|_| Err(Error::invalid_credential("invalid email or password")));
    let app = init_app!(service);

    let res = actix_test::call_service(&app, login_request("ada@example.com", "wrong").to_request()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(
        res.response()
            .cookies()
            .all(|cookie| cookie.name() != AUTH_COOKIE)
    );
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], ErrorCode::InvalidCredential.as_str());
    assert_eq!(body["message"], "invalid email or password");
}

#[rstest]
#[case("not-an-email", "secret", "email", "invalid_email")]
#[case("ada@example.com", "", "password", "empty_password")]
#[actix_web::test]
async fn malformed_payloads_never_reach_the_service(
    #[case] email: &str,
    #[case] password: &str,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = init_app!(MockLoginService::new());

    let res = actix_test::call_service(&app, login_request(email, password).to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], ErrorCode::ValidationError.as_str());
    assert_eq!(body["details"]["field"], field);
    assert_eq!(body["details"]["code"], code);
}
