//! Feedback board entry-point: loads settings, wires stores, and serves HTTP.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use feedback_board::inbound::http::health::HealthState;
use feedback_board::inbound::http::state::AuthCookiePolicy;
use feedback_board::inbound::http::token_config::{BuildMode, token_settings_from_env};
use feedback_board::outbound::persistence::{DbPool, PoolConfig, apply_migrations};
use feedback_board::settings::ServerSettings;

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let token_ttl = settings.token_ttl().map_err(std::io::Error::other)?;
    let token = token_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;

    let max_connections = settings
        .database_max_connections()
        .map_err(std::io::Error::other)?;
    let db_pool = match settings.database_url.as_deref() {
        Some(url) => Some(connect_database(url, max_connections).await?),
        None => None,
    };

    let config = ServerConfig::new(
        bind_addr,
        token.key,
        token_ttl,
        AuthCookiePolicy {
            secure: token.cookie_secure,
        },
    )
    .with_db_pool(db_pool)
    .with_users_file(settings.users_file);

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "feedback board listening");
    server.await
}

async fn connect_database(url: &str, max_connections: Option<u32>) -> std::io::Result<DbPool> {
    apply_migrations(url)
        .await
        .map_err(|e| std::io::Error::other(format!("apply migrations: {e}")))?;
    let config = match max_connections {
        Some(size) => PoolConfig::new(url).with_max_size(size),
        None => PoolConfig::new(url),
    };
    DbPool::new(config)
        .await
        .map_err(|e| std::io::Error::other(format!("create database pool: {e}")))
}
