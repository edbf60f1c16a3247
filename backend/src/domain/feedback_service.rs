//! Feedback lifecycle service.
//!
//! Implements the feedback driving ports: every call resolves authority
//! through [`ensure_allowed`], validates inputs, performs one atomic store
//! mutation, and projects the result for the calling principal.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    FeedbackCommand, FeedbackQuery, FeedbackRepository, FeedbackRepositoryError,
    SubmitFeedbackRequest, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Action, Error, Feedback, FeedbackDraft, FeedbackId, FeedbackMessage, FeedbackSort,
    FeedbackStatus, FeedbackTitle, FeedbackView, LikeToggle, ListScope, Principal, UserId,
    ensure_allowed,
};

/// Display name shown when an owner record cannot be found.
pub const UNKNOWN_OWNER: &str = "Unknown user";

fn map_feedback_error(error: FeedbackRepositoryError) -> Error {
    match error {
        FeedbackRepositoryError::NotFound { id } => {
            Error::not_found(format!("feedback {id} not found"))
        }
        FeedbackRepositoryError::Connection { message } => {
            debug!(%message, "feedback repository unavailable");
            Error::service_unavailable(format!("feedback repository unavailable: {message}"))
        }
        FeedbackRepositoryError::Query { message } => {
            debug!(%message, "feedback repository query failed");
            Error::internal(format!("feedback repository error: {message}"))
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { email } => {
            Error::internal(format!("unexpected duplicate email {email}"))
        }
    }
}

fn acting_user(principal: &Principal) -> Result<&UserId, Error> {
    principal
        .user_id()
        .ok_or_else(|| Error::unauthenticated("sign in to continue"))
}

/// Feedback service implementing the command and query driving ports.
#[derive(Clone)]
pub struct FeedbackService<R, U> {
    feedback_repo: Arc<R>,
    user_repo: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<R, U> FeedbackService<R, U> {
    /// Create a service over the feedback and user repositories.
    pub fn new(feedback_repo: Arc<R>, user_repo: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            feedback_repo,
            user_repo,
            clock,
        }
    }
}

impl<R, U> FeedbackService<R, U>
where
    R: FeedbackRepository,
    U: UserRepository,
{
    async fn owner_names(&self, items: &[Feedback]) -> Result<HashMap<UserId, String>, Error> {
        let owners: Vec<UserId> = items
            .iter()
            .map(|item| item.owner().clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if owners.is_empty() {
            return Ok(HashMap::new());
        }

        let users = self
            .user_repo
            .find_by_ids(&owners)
            .await
            .map_err(map_user_error)?;
        Ok(users
            .into_iter()
            .map(|user| (user.id().clone(), user.display_name().as_ref().to_owned()))
            .collect())
    }

    async fn project_one(
        &self,
        feedback: &Feedback,
        principal: &Principal,
    ) -> Result<FeedbackView, Error> {
        let names = self.owner_names(std::slice::from_ref(feedback)).await?;
        Ok(project_with(feedback, &names, principal))
    }

    async fn load(&self, id: FeedbackId) -> Result<Feedback, Error> {
        self.feedback_repo
            .get(id)
            .await
            .map_err(map_feedback_error)?
            .ok_or_else(|| Error::not_found(format!("feedback {id} not found")))
    }
}

fn project_with(
    feedback: &Feedback,
    names: &HashMap<UserId, String>,
    principal: &Principal,
) -> FeedbackView {
    let name = names.get(feedback.owner()).map_or_else(
        || {
            warn!(owner = %feedback.owner(), feedback = %feedback.id(), "feedback owner not found");
            UNKNOWN_OWNER
        },
        String::as_str,
    );
    FeedbackView::project(feedback, name, principal)
}

#[async_trait]
impl<R, U> FeedbackCommand for FeedbackService<R, U>
where
    R: FeedbackRepository,
    U: UserRepository,
{
    async fn submit_feedback(
        &self,
        principal: &Principal,
        request: SubmitFeedbackRequest,
    ) -> Result<FeedbackView, Error> {
        ensure_allowed(principal, &Action::Submit)?;
        let owner = acting_user(principal)?.clone();

        let title = FeedbackTitle::new(request.title).map_err(|err| {
            Error::validation(err.to_string()).with_details(json!({ "field": "title" }))
        })?;
        let message = FeedbackMessage::new(request.message).map_err(|err| {
            Error::validation(err.to_string()).with_details(json!({ "field": "message" }))
        })?;

        let created = self
            .feedback_repo
            .create(FeedbackDraft {
                owner,
                title,
                message,
                created_at: self.clock.utc(),
            })
            .await
            .map_err(map_feedback_error)?;
        info!(feedback = %created.id(), owner = %created.owner(), "feedback submitted");

        self.project_one(&created, principal).await
    }

    async fn delete_feedback(&self, principal: &Principal, id: FeedbackId) -> Result<(), Error> {
        // Anonymous callers must not learn which ids exist.
        acting_user(principal)?;
        let existing = self.load(id).await?;
        ensure_allowed(
            principal,
            &Action::Delete {
                owner: existing.owner(),
            },
        )?;

        self.feedback_repo
            .delete(id)
            .await
            .map_err(map_feedback_error)?;
        info!(feedback = %id, by = ?principal.user_id().map(ToString::to_string), "feedback deleted");
        Ok(())
    }

    async fn set_feedback_status(
        &self,
        principal: &Principal,
        id: FeedbackId,
        status: &str,
    ) -> Result<FeedbackView, Error> {
        ensure_allowed(principal, &Action::SetStatus)?;
        let status = status.parse::<FeedbackStatus>().map_err(|err| {
            Error::validation(err.to_string()).with_details(json!({
                "field": "status",
                "allowed": FeedbackStatus::ALL.map(FeedbackStatus::as_str),
            }))
        })?;

        let updated = self
            .feedback_repo
            .set_status(id, status)
            .await
            .map_err(map_feedback_error)?;
        info!(feedback = %id, %status, "feedback status changed");

        self.project_one(&updated, principal).await
    }

    async fn toggle_feedback_like(
        &self,
        principal: &Principal,
        id: FeedbackId,
    ) -> Result<LikeToggle, Error> {
        ensure_allowed(principal, &Action::ToggleLike)?;
        let user_id = acting_user(principal)?;

        let toggle = self
            .feedback_repo
            .toggle_like(id, user_id)
            .await
            .map_err(map_feedback_error)?;
        debug!(feedback = %id, user = %user_id, state = ?toggle.state, likes = toggle.like_count, "like toggled");
        Ok(toggle)
    }
}

#[async_trait]
impl<R, U> FeedbackQuery for FeedbackService<R, U>
where
    R: FeedbackRepository,
    U: UserRepository,
{
    async fn list_feedback(
        &self,
        principal: &Principal,
        scope: ListScope,
        sort: FeedbackSort,
    ) -> Result<Vec<FeedbackView>, Error> {
        let action = match scope {
            ListScope::Public => Action::ListPublic,
            ListScope::All => Action::ListAll,
        };
        ensure_allowed(principal, &action)?;

        let items = match scope {
            ListScope::Public => self
                .feedback_repo
                .list_by_status(FeedbackStatus::Approved)
                .await,
            ListScope::All => self.feedback_repo.list_all().await,
        }
        .map_err(map_feedback_error)?;

        let visible: Vec<Feedback> = items
            .into_iter()
            .filter(|item| scope.admits(item.status()))
            .collect();
        let names = self.owner_names(&visible).await?;

        let mut views: Vec<FeedbackView> = visible
            .iter()
            .map(|item| project_with(item, &names, principal))
            .collect();
        sort.apply(&mut views);
        Ok(views)
    }
}

#[cfg(test)]
#[path = "feedback_service_tests.rs"]
mod tests;
