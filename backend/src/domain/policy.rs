//! Authorization policy.
//!
//! Every authority check in the crate goes through [`authorize`]. Ownership
//! and moderation authority are independent predicates; an action that
//! accepts either combines them with OR.

use super::{Error, Principal, UserId};

/// An action a principal attempts, carrying the resource data the decision
/// depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    /// Submit a new feedback item.
    Submit,
    /// Delete the item owned by `owner`.
    Delete { owner: &'a UserId },
    /// Change an item's moderation status.
    SetStatus,
    /// Like or unlike an item.
    ToggleLike,
    /// List every item regardless of status.
    ListAll,
    /// List publicly visible items.
    ListPublic,
}

impl Action<'_> {
    fn describe(&self) -> &'static str {
        match self {
            Self::Submit => "submit feedback",
            Self::Delete { .. } => "delete this feedback",
            Self::SetStatus => "change feedback status",
            Self::ToggleLike => "like feedback",
            Self::ListAll => "list all feedback",
            Self::ListPublic => "list feedback",
        }
    }
}

/// Why an action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The action needs an authenticated principal.
    Unauthenticated,
    /// The principal lacks the required authority.
    Forbidden,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decide whether `principal` may perform `action`.
///
/// # Examples
/// ```
/// use feedback_board::domain::{authorize, Action, Decision, DenyReason, Principal};
///
/// assert_eq!(authorize(&Principal::Anonymous, &Action::ListPublic), Decision::Allow);
/// assert_eq!(
///     authorize(&Principal::Anonymous, &Action::Submit),
///     Decision::Deny(DenyReason::Unauthenticated)
/// );
/// ```
pub fn authorize(principal: &Principal, action: &Action<'_>) -> Decision {
    if matches!(action, Action::ListPublic) {
        return Decision::Allow;
    }

    let Principal::Authenticated { user_id, is_admin } = principal else {
        return Decision::Deny(DenyReason::Unauthenticated);
    };

    let allowed = match action {
        Action::Submit | Action::ToggleLike | Action::ListPublic => true,
        Action::Delete { owner } => *is_admin || user_id == *owner,
        Action::SetStatus | Action::ListAll => *is_admin,
    };

    if allowed {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::Forbidden)
    }
}

/// Run [`authorize`] and convert a denial into a domain [`Error`].
pub fn ensure_allowed(principal: &Principal, action: &Action<'_>) -> Result<(), Error> {
    match authorize(principal, action) {
        Decision::Allow => Ok(()),
        Decision::Deny(DenyReason::Unauthenticated) => Err(Error::unauthenticated(format!(
            "sign in to {}",
            action.describe()
        ))),
        Decision::Deny(DenyReason::Forbidden) => Err(Error::forbidden(format!(
            "not permitted to {}",
            action.describe()
        ))),
    }
}
