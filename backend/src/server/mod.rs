//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use feedback_board::Trace;
#[cfg(debug_assertions)]
use feedback_board::doc::ApiDoc;
use feedback_board::inbound::http::error::configure_extractors;
use feedback_board::inbound::http::feedback;
use feedback_board::inbound::http::health::{HealthState, live, ready};
use feedback_board::inbound::http::state::HttpState;
use feedback_board::inbound::http::users::login;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .configure(configure_extractors)
        .service(login)
        .configure(feedback::configure);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is bound.
/// - `config`: pre-built [`ServerConfig`] naming the stores, signing key,
///   and listen address.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when loading the user seed, binding the
/// socket, or registering metrics fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config)?;
    let bind_addr = config.bind_addr;

    #[cfg(feature = "metrics")]
    let prometheus = metrics::build_metrics()?;

    let server = HttpServer::new(move || {
        let app = build_app(server_health_state.clone(), http_state.clone());

        #[cfg(feature = "metrics")]
        let app = app.wrap(prometheus.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! Route wiring checks against in-memory stores.

    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use chrono::TimeDelta;
    use feedback_board::inbound::http::state::AuthCookiePolicy;
    use feedback_board::inbound::http::token_config::TokenKey;
    use rstest::rstest;

    fn http_state() -> web::Data<HttpState> {
        let config = ServerConfig::new(
            "127.0.0.1:0".parse().expect("socket addr"),
            TokenKey::Ephemeral,
            TimeDelta::hours(1),
            AuthCookiePolicy { secure: false },
        );
        build_http_state(&config).expect("state")
    }

    #[rstest]
    #[case("/api/v1/feedback", StatusCode::OK)]
    #[case("/api/v1/feedback/admin", StatusCode::UNAUTHORIZED)]
    #[case("/health/live", StatusCode::OK)]
    #[case("/health/ready", StatusCode::SERVICE_UNAVAILABLE)]
    #[actix_web::test]
    async fn routes_are_mounted(#[case] path: &str, #[case] expected: StatusCode) {
        let app =
            test::init_service(build_app(web::Data::new(HealthState::new()), http_state())).await;
        let res = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
        assert_eq!(res.status(), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_bodies_are_validation_errors() {
        let app =
            test::init_service(build_app(web::Data::new(HealthState::new()), http_state())).await;
        let req = test::TestRequest::post()
            .uri("/api/v1/login")
            .insert_header(("content-type", "application/json"))
            .set_payload("{ not json")
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "validation_error");
    }

    #[rstest]
    #[actix_web::test]
    async fn login_with_unknown_user_is_rejected() {
        let app =
            test::init_service(build_app(web::Data::new(HealthState::new()), http_state())).await;
        let req = test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(serde_json::json!({"email": "ada@example.com", "password": "pw"}))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
