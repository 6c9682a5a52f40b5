use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A registered reader as seen by the engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub is_private: bool,
    pub avatar_url: Option<String>,
}

/// Public identity of a user embedded in other payloads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub avatar_url: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// Relationship state of a follow from requester to target
///
/// `None` is not stored; it stands for the absence of a follow row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowStatus {
    None,
    Pending,
    Accepted,
}

impl FollowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowStatus::None => "none",
            FollowStatus::Pending => "pending",
            FollowStatus::Accepted => "accepted",
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, FollowStatus::Accepted)
    }
}

impl FromStr for FollowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(FollowStatus::None),
            "pending" => Ok(FollowStatus::Pending),
            "accepted" => Ok(FollowStatus::Accepted),
            other => Err(format!("Unknown follow status: {}", other)),
        }
    }
}

/// Accepted follower/following totals for one user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowCounts {
    pub followers: i64,
    pub following: i64,
}

/// Profile header returned for any existing user
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    pub is_private: bool,
    pub avatar_url: Option<String>,
    pub followers_count: i64,
    pub following_count: i64,
    pub is_me: bool,
    pub follow_status: FollowStatus,
}

/// An author a user has liked, newest first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LikedAuthor {
    pub id: i64,
    pub name: String,
    pub photo_url: Option<String>,
    pub liked_at: chrono::DateTime<chrono::Utc>,
}

/// Response to a follow request
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct FollowOutcome {
    pub status: FollowStatus,
}

/// A stored follow row
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Follow {
    pub id: i64,
    pub requester_id: i64,
    pub target_id: i64,
    pub status: FollowStatus,
}

/// A pending follow awaiting the target's decision
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FollowRequest {
    pub id: i64,
    pub requester: UserSummary,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
