//! Feedback item model.
//!
//! A feedback item owns its liker set; the like count is always derived from
//! it, so the count cannot drift from the membership it summarises.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FeedbackStatus, LikeState, LikeToggle, UserId};

/// Maximum title length in characters.
pub const TITLE_MAX: usize = 120;
/// Maximum message length in characters.
pub const MESSAGE_MAX: usize = 2000;

/// Validation errors returned by the feedback value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedbackValidationError {
    #[error("feedback id must be a positive integer")]
    InvalidId,
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("message must be at most {max} characters")]
    MessageTooLong { max: usize },
}

/// Monotonic positive feedback identifier assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct FeedbackId(u64);

impl FeedbackId {
    /// Validate a raw identifier.
    ///
    /// # Examples
    /// ```
    /// use feedback_board::domain::FeedbackId;
    ///
    /// assert_eq!(FeedbackId::new(7).unwrap().get(), 7);
    /// assert!(FeedbackId::new(0).is_err());
    /// ```
    pub fn new(raw: u64) -> Result<Self, FeedbackValidationError> {
        if raw == 0 {
            return Err(FeedbackValidationError::InvalidId);
        }
        Ok(Self(raw))
    }

    /// Raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FeedbackId {
    type Err = FeedbackValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .parse::<u64>()
            .map_err(|_| FeedbackValidationError::InvalidId)?;
        Self::new(raw)
    }
}

impl TryFrom<u64> for FeedbackId {
    type Error = FeedbackValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FeedbackId> for u64 {
    fn from(value: FeedbackId) -> Self {
        value.0
    }
}

fn bounded_text(
    raw: String,
    max: usize,
    empty: FeedbackValidationError,
    too_long: FeedbackValidationError,
) -> Result<String, FeedbackValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(empty);
    }
    if trimmed.chars().count() > max {
        return Err(too_long);
    }
    if trimmed.len() == raw.len() {
        Ok(raw)
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Feedback title, trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FeedbackTitle(String);

impl FeedbackTitle {
    pub fn new(raw: impl Into<String>) -> Result<Self, FeedbackValidationError> {
        bounded_text(
            raw.into(),
            TITLE_MAX,
            FeedbackValidationError::EmptyTitle,
            FeedbackValidationError::TitleTooLong { max: TITLE_MAX },
        )
        .map(Self)
    }
}

impl AsRef<str> for FeedbackTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<FeedbackTitle> for String {
    fn from(value: FeedbackTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for FeedbackTitle {
    type Error = FeedbackValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Feedback body text, trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FeedbackMessage(String);

impl FeedbackMessage {
    pub fn new(raw: impl Into<String>) -> Result<Self, FeedbackValidationError> {
        bounded_text(
            raw.into(),
            MESSAGE_MAX,
            FeedbackValidationError::EmptyMessage,
            FeedbackValidationError::MessageTooLong { max: MESSAGE_MAX },
        )
        .map(Self)
    }
}

impl AsRef<str> for FeedbackMessage {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<FeedbackMessage> for String {
    fn from(value: FeedbackMessage) -> Self {
        value.0
    }
}

impl TryFrom<String> for FeedbackMessage {
    type Error = FeedbackValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Validated submission awaiting an identifier from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackDraft {
    pub owner: UserId,
    pub title: FeedbackTitle,
    pub message: FeedbackMessage,
    pub created_at: DateTime<Utc>,
}

/// Stored components used to rebuild a [`Feedback`] from persistence.
#[derive(Debug, Clone)]
pub struct FeedbackParts {
    pub id: FeedbackId,
    pub owner: UserId,
    pub title: FeedbackTitle,
    pub message: FeedbackMessage,
    pub created_at: DateTime<Utc>,
    pub status: FeedbackStatus,
    pub likers: BTreeSet<UserId>,
}

/// A feedback item with its moderation status and liker set.
///
/// ## Invariants
/// - `id`, `owner`, and `created_at` never change.
/// - `like_count() == likers().len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    id: FeedbackId,
    owner: UserId,
    title: FeedbackTitle,
    message: FeedbackMessage,
    created_at: DateTime<Utc>,
    status: FeedbackStatus,
    likers: BTreeSet<UserId>,
}

impl Feedback {
    /// Materialise a fresh submission: pending, no likes.
    pub fn from_draft(id: FeedbackId, draft: FeedbackDraft) -> Self {
        let FeedbackDraft {
            owner,
            title,
            message,
            created_at,
        } = draft;
        Self {
            id,
            owner,
            title,
            message,
            created_at,
            status: FeedbackStatus::Pending,
            likers: BTreeSet::new(),
        }
    }

    /// Rebuild a stored item.
    pub fn from_parts(parts: FeedbackParts) -> Self {
        let FeedbackParts {
            id,
            owner,
            title,
            message,
            created_at,
            status,
            likers,
        } = parts;
        Self {
            id,
            owner,
            title,
            message,
            created_at,
            status,
            likers,
        }
    }

    pub fn id(&self) -> FeedbackId {
        self.id
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn title(&self) -> &FeedbackTitle {
        &self.title
    }

    pub fn message(&self) -> &FeedbackMessage {
        &self.message
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn status(&self) -> FeedbackStatus {
        self.status
    }

    /// Users currently liking this item.
    pub fn likers(&self) -> &BTreeSet<UserId> {
        &self.likers
    }

    /// Number of likes, derived from the liker set.
    pub fn like_count(&self) -> u64 {
        u64::try_from(self.likers.len()).unwrap_or(u64::MAX)
    }

    /// Whether `user_id` currently likes this item.
    pub fn is_liked_by(&self, user_id: &UserId) -> bool {
        self.likers.contains(user_id)
    }

    /// Replace the moderation status.
    pub fn set_status(&mut self, status: FeedbackStatus) {
        self.status = status;
    }

    /// Flip `user_id`'s membership in the liker set.
    ///
    /// Applying the same toggle twice restores the original state.
    pub fn toggle_like(&mut self, user_id: &UserId) -> LikeToggle {
        let state = if self.likers.remove(user_id) {
            LikeState::Unliked
        } else {
            self.likers.insert(user_id.clone());
            LikeState::Liked
        };
        LikeToggle {
            state,
            like_count: self.like_count(),
        }
    }
}
