//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::TimeDelta;
use feedback_board::inbound::http::state::AuthCookiePolicy;
use feedback_board::inbound::http::token_config::TokenKey;
use feedback_board::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) token_key: TokenKey,
    pub(crate) token_ttl: TimeDelta,
    pub(crate) auth_cookie: AuthCookiePolicy,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) users_file: Option<PathBuf>,
}

impl ServerConfig {
    /// Construct a server configuration with in-memory stores.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        token_key: TokenKey,
        token_ttl: TimeDelta,
        auth_cookie: AuthCookiePolicy,
    ) -> Self {
        Self {
            bind_addr,
            token_key,
            token_ttl,
            auth_cookie,
            db_pool: None,
            users_file: None,
        }
    }

    /// Attach a database connection pool.
    ///
    /// When provided, the feedback and user stores are PostgreSQL-backed and
    /// any users file is ignored.
    #[must_use]
    pub fn with_db_pool(mut self, pool: Option<DbPool>) -> Self {
        self.db_pool = pool;
        self
    }

    /// Seed the in-memory user store from a JSON file.
    #[must_use]
    pub fn with_users_file(mut self, path: Option<PathBuf>) -> Self {
        self.users_file = path;
        self
    }
}
