//! Tests for HTTP error mapping.

use super::*;
use crate::domain::Error;
use actix_web::ResponseError;
use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::unauthenticated("sign in"), StatusCode::UNAUTHORIZED)]
#[case(Error::invalid_credential("bad token"), StatusCode::UNAUTHORIZED)]
#[case(Error::principal_not_found("gone"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::validation("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

async fn assert_error_response(
    error: Error,
    expected_status: StatusCode,
    expected_trace_id: Option<&str>,
) -> Error {
    let response = ResponseError::error_response(&error);
    assert_eq!(response.status(), expected_status);

    let header = response.headers().get(TRACE_ID_HEADER);
    match expected_trace_id {
        Some(expected) => {
            let trace_id = header
                .expect("trace-id header is set by error_response")
                .to_str()
                .expect("trace-id is valid UTF-8");
            assert_eq!(trace_id, expected);
        }
        None => assert!(header.is_none(), "trace-id header should not be present"),
    }

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    serde_json::from_slice(&bytes).expect("Error JSON deserialisation succeeds")
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted_but_keep_trace_id(expected_trace_id: String) {
    let error = Error::internal("connection string postgres://secret")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({"secret": "x"}));

    let redacted = assert_error_response(
        error,
        StatusCode::INTERNAL_SERVER_ERROR,
        Some(expected_trace_id.as_str()),
    )
    .await;
    assert_eq!(redacted.code(), ErrorCode::InternalError);
    assert_eq!(redacted.message(), REDACTED_MESSAGE);
    assert!(redacted.details().is_none());
}

#[rstest]
#[actix_web::test]
async fn client_errors_keep_message_and_details(expected_trace_id: String) {
    let error = Error::validation("title must not be empty")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({"field": "title"}));

    let payload = assert_error_response(
        error,
        StatusCode::BAD_REQUEST,
        Some(expected_trace_id.as_str()),
    )
    .await;
    assert_eq!(payload.code(), ErrorCode::ValidationError);
    assert_eq!(payload.message(), "title must not be empty");
    assert_eq!(payload.details(), Some(&json!({"field": "title"})));
}

#[rstest]
#[actix_web::test]
async fn error_without_trace_id_omits_trace_header() {
    let payload =
        assert_error_response(Error::forbidden("denied"), StatusCode::FORBIDDEN, None).await;
    assert_eq!(payload.code(), ErrorCode::Forbidden);
    assert_eq!(payload.trace_id(), None);
}

#[test]
fn from_actix_error_is_redacted_internal_error() {
    let err: Error = actix_web::error::ErrorBadRequest("boom").into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), REDACTED_MESSAGE);
    assert_eq!(err.details(), None);
}

#[rstest]
#[case(Error::unauthenticated("sign in"), Some("Bearer"))]
#[case(Error::invalid_credential("bad token"), Some(r#"Bearer error="invalid_token""#))]
#[case(Error::principal_not_found("gone"), Some(r#"Bearer error="invalid_token""#))]
#[case(Error::forbidden("denied"), None)]
#[case(Error::validation("bad"), None)]
fn unauthorized_responses_carry_a_bearer_challenge(
    #[case] err: Error,
    #[case] expected: Option<&str>,
) {
    let response = ResponseError::error_response(&err);
    let challenge = response
        .headers()
        .get(actix_web::http::header::WWW_AUTHENTICATE)
        .map(|value| value.to_str().expect("ascii header"));
    assert_eq!(challenge, expected);
}

#[rstest]
#[actix_web::test]
async fn json_payload_failures_become_validation_errors() {
    let req = actix_web::test::TestRequest::default().to_http_request();
    let err = json_error_handler(actix_web::error::JsonPayloadError::ContentType, &req);
    let response = err.error_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    let payload: Error = serde_json::from_slice(&bytes).expect("Error JSON");
    assert_eq!(payload.code(), ErrorCode::ValidationError);
    assert_eq!(payload.message(), "request body must be application/json");
    assert_eq!(payload.details(), Some(&json!({"field": "body"})));
}
