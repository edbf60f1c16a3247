//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every feedback board endpoint, the request and
//! response bodies, and the bearer credential schemes. Swagger UI serves it
//! in debug builds and `openapi-dump` writes it for external tooling.

use crate::inbound::http::feedback::{
    FeedbackViewBody, LikeToggleBody, SetStatusBody, SubmitFeedbackBody,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{LoginRequest, LoginResponse, UserBody};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Register the bearer header and `authToken` cookie schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
        components.add_security_scheme(
            "AuthCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "authToken",
                "Token cookie set by POST /api/v1/login; used when no Authorization header is sent.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Feedback board API",
        description = "Submit, moderate, like, and list user feedback.",
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::feedback::list_public,
        crate::inbound::http::feedback::list_admin,
        crate::inbound::http::feedback::submit,
        crate::inbound::http::feedback::remove,
        crate::inbound::http::feedback::set_status,
        crate::inbound::http::feedback::toggle_like,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        FeedbackViewBody,
        LikeToggleBody,
        LoginRequest,
        LoginResponse,
        SetStatusBody,
        SubmitFeedbackBody,
        UserBody,
    )),
    tags(
        (name = "feedback", description = "Feedback submission, moderation, and likes"),
        (name = "users", description = "Sign-in"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Structure checks on the generated document.

    use super::*;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[test]
    fn feedback_view_exposes_projection_fields_only() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let view = schemas.get("FeedbackViewBody").expect("view schema");

        for field in ["id", "ownerDisplayName", "likeCount", "isOwner", "likedByMe"] {
            assert_object_schema_has_field(view, field);
        }
        let RefOr::T(Schema::Object(obj)) = view else {
            panic!("expected Object schema");
        };
        assert!(!obj.properties.contains_key("likers"));
    }

    #[test]
    fn every_feedback_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/login",
            "/api/v1/feedback",
            "/api/v1/feedback/admin",
            "/api/v1/feedback/{id}",
            "/api/v1/feedback/{id}/status",
            "/api/v1/feedback/{id}/like",
            "/health/ready",
            "/health/live",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("BearerToken"));
        assert!(components.security_schemes.contains_key("AuthCookie"));
    }
}
