//! Driving port for feedback listings.

use async_trait::async_trait;

use crate::domain::{Error, FeedbackSort, FeedbackView, ListScope, Principal};

/// Feedback read use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackQuery: Send + Sync {
    /// List the items in `scope` as seen by `principal`.
    ///
    /// [`ListScope::All`] is refused for non-administrators rather than
    /// returning an empty list.
    async fn list_feedback(
        &self,
        principal: &Principal,
        scope: ListScope,
        sort: FeedbackSort,
    ) -> Result<Vec<FeedbackView>, Error>;
}
