//! User-facing feedback projection.
//!
//! Views are built per principal: they carry `is_owner` and `liked_by_me`
//! flags but never the liker set itself.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Feedback, FeedbackId, FeedbackStatus, Principal, UserId};

/// Projection of a feedback item for one principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackView {
    pub id: FeedbackId,
    pub owner_id: UserId,
    pub owner_display_name: String,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub status: FeedbackStatus,
    pub like_count: u64,
    pub is_owner: bool,
    pub liked_by_me: bool,
}

impl FeedbackView {
    /// Project `feedback` for `principal`.
    pub fn project(
        feedback: &Feedback,
        owner_display_name: impl Into<String>,
        principal: &Principal,
    ) -> Self {
        let (is_owner, liked_by_me) = match principal.user_id() {
            Some(user_id) => (feedback.owner() == user_id, feedback.is_liked_by(user_id)),
            None => (false, false),
        };
        Self {
            id: feedback.id(),
            owner_id: feedback.owner().clone(),
            owner_display_name: owner_display_name.into(),
            title: feedback.title().as_ref().to_owned(),
            message: feedback.message().as_ref().to_owned(),
            created_at: feedback.created_at(),
            status: feedback.status(),
            like_count: feedback.like_count(),
            is_owner,
            liked_by_me,
        }
    }
}

/// Keep only the views the viewing principal owns.
pub fn retain_owned(views: &mut Vec<FeedbackView>) {
    views.retain(|view| view.is_owner);
}

/// Error raised for an unknown sort key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("sort must be one of newest, most_liked; got '{0}'")]
pub struct InvalidSortError(String);

/// Listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackSort {
    /// Creation time, most recent first.
    #[default]
    Newest,
    /// Like count, highest first.
    MostLiked,
}

impl FeedbackSort {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::MostLiked => "most_liked",
        }
    }

    /// Total order over views; ties fall back to ascending id.
    pub fn compare(self, a: &FeedbackView, b: &FeedbackView) -> Ordering {
        let primary = match self {
            Self::Newest => b.created_at.cmp(&a.created_at),
            Self::MostLiked => b.like_count.cmp(&a.like_count),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }

    /// Sort `views` in place.
    pub fn apply(self, views: &mut [FeedbackView]) {
        views.sort_by(|a, b| self.compare(a, b));
    }
}

impl fmt::Display for FeedbackSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackSort {
    type Err = InvalidSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "newest" => Ok(Self::Newest),
            "most_liked" => Ok(Self::MostLiked),
            other => Err(InvalidSortError(other.to_owned())),
        }
    }
}
