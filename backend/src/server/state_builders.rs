//! Builders for HTTP state from configured stores.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::info;

use feedback_board::domain::ports::{FeedbackRepository, UserRepository};
use feedback_board::domain::{CredentialLoginService, FeedbackService, TokenPrincipalResolver};
use feedback_board::inbound::http::state::{HttpState, HttpStatePorts};
use feedback_board::inbound::http::token_config::TokenKey;
use feedback_board::outbound::credentials::Sha256PasswordHasher;
use feedback_board::outbound::memory::{InMemoryFeedbackRepository, InMemoryUserRepository};
use feedback_board::outbound::persistence::{DieselFeedbackRepository, DieselUserRepository};
use feedback_board::outbound::token::JwtTokenCodec;

use super::ServerConfig;

fn build_token_codec(config: &ServerConfig, clock: Arc<dyn Clock>) -> JwtTokenCodec {
    match &config.token_key {
        TokenKey::Loaded(bytes) => JwtTokenCodec::new(bytes.to_vec(), config.token_ttl, clock),
        TokenKey::Ephemeral => JwtTokenCodec::ephemeral(config.token_ttl, clock),
    }
}

/// Wire the domain services over one feedback store and one user store.
fn build_ports<R, U>(
    feedback_repo: Arc<R>,
    user_repo: Arc<U>,
    tokens: Arc<JwtTokenCodec>,
    clock: Arc<dyn Clock>,
) -> HttpStatePorts
where
    R: FeedbackRepository + 'static,
    U: UserRepository + 'static,
{
    let feedback = Arc::new(FeedbackService::new(feedback_repo, user_repo.clone(), clock));
    let login = CredentialLoginService::new(
        user_repo.clone(),
        Arc::new(Sha256PasswordHasher::new()),
        tokens.clone(),
    );
    HttpStatePorts {
        feedback: feedback.clone(),
        feedback_query: feedback,
        login: Arc::new(login),
        principals: Arc::new(TokenPrincipalResolver::new(tokens, user_repo)),
    }
}

/// Build the shared HTTP state.
///
/// Uses the Diesel repositories when a pool is configured, otherwise fresh
/// in-memory stores with users optionally seeded from the users file.
///
/// # Errors
/// Returns [`std::io::Error`] when the users file cannot be loaded.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let tokens = Arc::new(build_token_codec(config, clock.clone()));

    let ports = match (&config.db_pool, &config.users_file) {
        (Some(pool), _) => {
            info!("using PostgreSQL stores");
            build_ports(
                Arc::new(DieselFeedbackRepository::new(pool.clone())),
                Arc::new(DieselUserRepository::new(pool.clone())),
                tokens,
                clock,
            )
        }
        (None, users_file) => {
            let users = match users_file {
                Some(path) => InMemoryUserRepository::from_seed_file(path)
                    .map_err(std::io::Error::other)?,
                None => InMemoryUserRepository::new(),
            };
            info!(users = users.len(), "using in-memory stores");
            build_ports(
                Arc::new(InMemoryFeedbackRepository::new()),
                Arc::new(users),
                tokens,
                clock,
            )
        }
    };

    Ok(web::Data::new(HttpState::with_cookie_policy(
        ports,
        config.auth_cookie,
    )))
}
