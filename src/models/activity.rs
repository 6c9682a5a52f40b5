use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{BookSummary, UserSummary};

/// Reading progress recorded for a (user, book) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingState {
    WantToRead,
    Reading,
    Finished,
    Dropped,
}

impl FromStr for ReadingState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "want_to_read" => Ok(ReadingState::WantToRead),
            "reading" => Ok(ReadingState::Reading),
            "finished" => Ok(ReadingState::Finished),
            "dropped" => Ok(ReadingState::Dropped),
            other => Err(format!("Unknown reading status: {}", other)),
        }
    }
}

/// A reading-status entry as stored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadingStatusEntry {
    pub user_id: i64,
    pub book: BookSummary,
    pub status: ReadingState,
    pub updated_at: DateTime<Utc>,
}

/// A non-hidden review as stored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewEntry {
    pub user_id: i64,
    pub book: BookSummary,
    pub rating: i32,
    pub body: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Status,
    Review,
}

/// One entry of a user's activity feed
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActivityItem {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub user: UserSummary,
    pub book: BookSummary,
    pub status: Option<ReadingState>,
    pub rating: Option<i32>,
    pub body: Option<String>,
    pub updated_at: DateTime<Utc>,
}
