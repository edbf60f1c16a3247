//! Server settings loaded via OrthoConfig.
//!
//! Values come from `FEEDBACK_*` environment variables, CLI flags, or a
//! configuration file, in OrthoConfig's usual precedence.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_TOKEN_TTL_HOURS: u32 = 168;
/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_TTL_HOURS: u32 = 24 * 366;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddress {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("token TTL must be between 1 and {max} hours, got {value}")]
    TokenTtlOutOfRange { value: u32, max: u32 },
    #[error("database pool needs at least one connection")]
    ZeroPoolSize,
}

/// Runtime configuration for the feedback board server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FEEDBACK")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_address: Option<String>,
    /// PostgreSQL URL. When absent, in-memory stores are used.
    pub database_url: Option<String>,
    /// JSON user seed for the in-memory user store.
    pub users_file: Option<PathBuf>,
    /// Lifetime of issued bearer tokens, in hours.
    #[ortho_config(default = DEFAULT_TOKEN_TTL_HOURS)]
    pub token_ttl_hours: u32,
    /// Upper bound on pooled PostgreSQL connections.
    pub database_max_connections: Option<u32>,
}

impl ServerSettings {
    /// Parsed listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self
            .bind_address
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDRESS);
        value.parse().map_err(|source| SettingsError::BindAddress {
            value: value.to_owned(),
            source,
        })
    }

    /// Token lifetime, defaulting to seven days.
    pub fn token_ttl(&self) -> Result<TimeDelta, SettingsError> {
        match self.token_ttl_hours {
            hours @ 1..=MAX_TOKEN_TTL_HOURS => Ok(TimeDelta::hours(i64::from(hours))),
            value => Err(SettingsError::TokenTtlOutOfRange {
                value,
                max: MAX_TOKEN_TTL_HOURS,
            }),
        }
    }

    /// Pool size override, if configured.
    pub fn database_max_connections(&self) -> Result<Option<u32>, SettingsError> {
        match self.database_max_connections {
            Some(0) => Err(SettingsError::ZeroPoolSize),
            other => Ok(other),
        }
    }
}
