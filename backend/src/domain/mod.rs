//! Domain primitives, policy, and services.
//!
//! Purpose: define the strongly typed feedback board model and the use-case
//! services behind the driving ports. Nothing here knows about HTTP or SQL.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload and stable code.
//! - User, Principal: identity of stored users and of the current caller.
//! - Feedback, FeedbackStatus, LikeToggle: the moderated, likeable item.
//! - authorize / ensure_allowed: the single authorization policy.
//! - FeedbackView, FeedbackSort: per-principal projection, ordering, and
//!   the caller-owned filter.
//! - FeedbackService, TokenPrincipalResolver, CredentialLoginService: driving
//!   port implementations.

pub mod auth;
pub mod engagement;
pub mod error;
pub mod feedback;
pub mod feedback_service;
pub mod identity;
pub mod login;
pub mod moderation;
pub mod policy;
pub mod ports;
pub mod projection;
pub mod trace_id;
pub mod user;

pub use self::auth::{BearerToken, LoginCredentials, LoginValidationError, Principal, TokenClaims};
pub use self::engagement::{LikeState, LikeToggle};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::feedback::{
    Feedback, FeedbackDraft, FeedbackId, FeedbackMessage, FeedbackParts, FeedbackTitle,
    FeedbackValidationError, MESSAGE_MAX, TITLE_MAX,
};
pub use self::feedback_service::{FeedbackService, UNKNOWN_OWNER};
pub use self::identity::TokenPrincipalResolver;
pub use self::login::CredentialLoginService;
pub use self::moderation::{FeedbackStatus, InvalidStatusError, ListScope};
pub use self::policy::{Action, Decision, DenyReason, authorize, ensure_allowed};
pub use self::projection::{FeedbackSort, FeedbackView, InvalidSortError, retain_owned};
pub use self::trace_id::TraceId;
pub use self::user::{
    CredentialHash, DISPLAY_NAME_MAX, DISPLAY_NAME_MIN, DisplayName, EmailAddress, User, UserId,
    UserParts, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use feedback_board::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
