//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{FeedbackCommand, FeedbackQuery, LoginService, PrincipalResolver};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub feedback: Arc<dyn FeedbackCommand>,
    pub feedback_query: Arc<dyn FeedbackQuery>,
    pub login: Arc<dyn LoginService>,
    pub principals: Arc<dyn PrincipalResolver>,
}

/// Attributes applied to the `authToken` cookie set on login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthCookiePolicy {
    pub secure: bool,
}

impl Default for AuthCookiePolicy {
    fn default() -> Self {
        Self { secure: true }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub feedback: Arc<dyn FeedbackCommand>,
    pub feedback_query: Arc<dyn FeedbackQuery>,
    pub login: Arc<dyn LoginService>,
    pub principals: Arc<dyn PrincipalResolver>,
    pub auth_cookie: AuthCookiePolicy,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle with the default cookie policy.
    pub fn new(ports: HttpStatePorts) -> Self {
        Self::with_cookie_policy(ports, AuthCookiePolicy::default())
    }

    /// Construct state from a ports bundle and explicit cookie attributes.
    pub fn with_cookie_policy(ports: HttpStatePorts, auth_cookie: AuthCookiePolicy) -> Self {
        let HttpStatePorts {
            feedback,
            feedback_query,
            login,
            principals,
        } = ports;
        Self {
            feedback,
            feedback_query,
            login,
            principals,
            auth_cookie,
        }
    }
}
