//! Like/unlike outcome types.

use serde::{Deserialize, Serialize};

/// Membership of the acting user in a liker set after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeState {
    Liked,
    Unliked,
}

/// Result of one like toggle.
///
/// `like_count` is the size of the liker set immediately after the toggle,
/// read under the same exclusive section that performed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggle {
    pub state: LikeState,
    pub like_count: u64,
}

impl LikeToggle {
    /// Whether the user likes the item after the toggle.
    pub const fn liked(&self) -> bool {
        matches!(self.state, LikeState::Liked)
    }
}
