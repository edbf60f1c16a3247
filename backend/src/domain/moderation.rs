//! Moderation status and visibility rules.
//!
//! Status is a flat, re-assignable classification: an administrator may move
//! an item from any status to any other (including back to `pending`). Only
//! `approved` items are publicly visible.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error raised when a status string is not one of the known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("status must be one of pending, approved, rejected; got '{value}'")]
pub struct InvalidStatusError {
    value: String,
}

impl InvalidStatusError {
    /// The rejected input.
    pub fn value(&self) -> &str {
        self.value.as_str()
    }
}

/// Moderation status of a feedback item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    /// Awaiting moderation. Initial status of every submission.
    #[default]
    Pending,
    /// Visible on the public board.
    Approved,
    /// Hidden from the public board.
    Rejected,
}

impl FeedbackStatus {
    /// All statuses, in declaration order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    /// Wire and storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Whether items in this status appear in the public listing.
    pub const fn is_publicly_visible(self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackStatus {
    type Err = InvalidStatusError;

    /// Parse a status, trimming surrounding whitespace. Matching is
    /// case-sensitive.
    ///
    /// # Examples
    /// ```
    /// use feedback_board::domain::FeedbackStatus;
    ///
    /// assert_eq!(" approved ".parse::<FeedbackStatus>().unwrap(), FeedbackStatus::Approved);
    /// assert!("archived".parse::<FeedbackStatus>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(InvalidStatusError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Which slice of the board a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListScope {
    /// Approved items only; open to every principal.
    #[default]
    Public,
    /// Every item regardless of status; administrators only.
    All,
}

impl ListScope {
    /// Whether an item in `status` belongs to this scope.
    pub const fn admits(self, status: FeedbackStatus) -> bool {
        match self {
            Self::Public => status.is_publicly_visible(),
            Self::All => true,
        }
    }
}
