//! Driving port for feedback mutations.
//!
//! Inputs arrive as raw strings; the service validates them after the
//! authorization check, so an anonymous caller learns nothing about which
//! inputs would have been accepted.

use async_trait::async_trait;

use crate::domain::{Error, FeedbackId, FeedbackView, LikeToggle, Principal};

/// Request to submit a feedback item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitFeedbackRequest {
    pub title: String,
    pub message: String,
}

/// Feedback mutation use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackCommand: Send + Sync {
    /// Submit a new pending item owned by the principal.
    async fn submit_feedback(
        &self,
        principal: &Principal,
        request: SubmitFeedbackRequest,
    ) -> Result<FeedbackView, Error>;

    /// Delete an item. Owners and administrators only.
    async fn delete_feedback(&self, principal: &Principal, id: FeedbackId) -> Result<(), Error>;

    /// Move an item to the status named by `status`. Administrators only.
    async fn set_feedback_status(
        &self,
        principal: &Principal,
        id: FeedbackId,
        status: &str,
    ) -> Result<FeedbackView, Error>;

    /// Like or unlike an item on behalf of the principal.
    async fn toggle_feedback_like(
        &self,
        principal: &Principal,
        id: FeedbackId,
    ) -> Result<LikeToggle, Error>;
}
