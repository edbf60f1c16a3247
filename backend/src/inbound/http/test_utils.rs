//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{
    FeedbackCommand, FeedbackQuery, LoginService, MockFeedbackCommand, MockFeedbackQuery,
    MockLoginService, MockPrincipalResolver, PrincipalResolver,
};
use crate::domain::{BearerToken, Principal, UserId};
use crate::inbound::http::state::{AuthCookiePolicy, HttpState, HttpStatePorts};

/// Port doubles for handler tests. Unset ports are mocks with no
/// expectations, so any unexpected call fails the test.
pub struct TestPorts {
    pub feedback: Arc<dyn FeedbackCommand>,
    pub feedback_query: Arc<dyn FeedbackQuery>,
    pub login: Arc<dyn LoginService>,
    pub principals: Arc<dyn PrincipalResolver>,
}

impl Default for TestPorts {
    fn default() -> Self {
        Self {
            feedback: Arc::new(MockFeedbackCommand::new()),
            feedback_query: Arc::new(MockFeedbackQuery::new()),
            login: Arc::new(MockLoginService::new()),
            principals: Arc::new(MockPrincipalResolver::new()),
        }
    }
}

impl TestPorts {
    /// Wrap the ports as shared handler state with an insecure cookie policy.
    pub fn into_state(self) -> web::Data<HttpState> {
        let Self {
            feedback,
            feedback_query,
            login,
            principals,
        } = self;
        web::Data::new(HttpState::with_cookie_policy(
            HttpStatePorts {
                feedback,
                feedback_query,
                login,
                principals,
            },
            AuthCookiePolicy { secure: false },
        ))
    }
}

/// Resolver that maps `Bearer <user uuid>` to a principal and no token to
/// anonymous. A `admin:` prefix marks the user as an administrator.
pub fn resolver_by_token() -> MockPrincipalResolver {
    let mut resolver = MockPrincipalResolver::new();
    resolver
        .expect_resolve()
        .returning(|token: Option<BearerToken>| {
            let Some(token) = token else {
                return Ok(Principal::Anonymous);
            };
            let raw = token.expose();
            let (is_admin, id) = match raw.strip_prefix("admin:") {
                Some(id) => (true, id),
                None => (false, raw),
            };
            let user_id = UserId::new(id)
                .map_err(|_| crate::domain::Error::invalid_credential("bad test token"))?;
            Ok(Principal::user(user_id, is_admin))
        });
    resolver
}
