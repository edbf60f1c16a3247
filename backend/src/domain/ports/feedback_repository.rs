//! Port for feedback persistence and the like relation.
//!
//! Every mutation is linearizable per feedback id: an adapter must apply
//! `delete`, `set_status`, and `toggle_like` for one id one at a time, while
//! operations on different ids may proceed concurrently.

use async_trait::async_trait;

use crate::domain::{Feedback, FeedbackDraft, FeedbackId, FeedbackStatus, LikeToggle, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by feedback repository adapters.
    pub enum FeedbackRepositoryError {
        /// No item exists with the requested id.
        NotFound { id: FeedbackId } => "feedback {id} not found",
        /// Repository connection could not be established.
        Connection { message: String } => "feedback repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "feedback repository query failed: {message}",
    }
}

/// Port for storing feedback items and their liker sets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Store a new pending item with an empty liker set and a fresh id.
    async fn create(&self, draft: FeedbackDraft) -> Result<Feedback, FeedbackRepositoryError>;

    /// Remove an item together with its likes.
    async fn delete(&self, id: FeedbackId) -> Result<(), FeedbackRepositoryError>;

    /// Replace an item's status and return the updated item.
    async fn set_status(
        &self,
        id: FeedbackId,
        status: FeedbackStatus,
    ) -> Result<Feedback, FeedbackRepositoryError>;

    /// Flip `user_id`'s like on an item as one atomic read-modify-write.
    async fn toggle_like(
        &self,
        id: FeedbackId,
        user_id: &UserId,
    ) -> Result<LikeToggle, FeedbackRepositoryError>;

    /// Fetch one item.
    async fn get(&self, id: FeedbackId) -> Result<Option<Feedback>, FeedbackRepositoryError>;

    /// Every item regardless of status.
    async fn list_all(&self) -> Result<Vec<Feedback>, FeedbackRepositoryError>;

    /// Items currently in `status`.
    async fn list_by_status(
        &self,
        status: FeedbackStatus,
    ) -> Result<Vec<Feedback>, FeedbackRepositoryError>;
}
