use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_SUBJECT_LEN: usize = 100;
pub const MAX_DETAILS_LEN: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Open,
    Claimed,
    Closed,
}

impl RequestStatus {
    /// Still waiting on staff (counts against the per-member limit).
    pub fn is_active(self) -> bool {
        !matches!(self, RequestStatus::Closed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Open => "open",
            RequestStatus::Claimed => "claimed",
            RequestStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    Claim,
    Close,
    Reopen,
}

impl fmt::Display for RequestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequestAction::Claim => "claim",
            RequestAction::Close => "close",
            RequestAction::Reopen => "reopen",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeskRequest {
    pub guild_id: u64,
    pub number: u64,
    pub author_id: u64,
    pub category_key: String,
    pub subject: String,
    pub details: String,
    pub status: RequestStatus,
    pub claimed_by: Option<u64>,
    pub closed_by: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub review_channel_id: Option<u64>,
    pub review_message_id: Option<u64>,
}

/// Everything a store needs to file a new request; the store picks the number.
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub guild_id: u64,
    pub author_id: u64,
    pub category_key: String,
    pub subject: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

impl NewRequest {
    pub fn into_request(self, number: u64) -> DeskRequest {
        DeskRequest {
            guild_id: self.guild_id,
            number,
            author_id: self.author_id,
            category_key: self.category_key,
            subject: self.subject,
            details: self.details,
            status: RequestStatus::Open,
            claimed_by: None,
            closed_by: None,
            created_at: self.created_at,
            updated_at: self.created_at,
            review_channel_id: None,
            review_message_id: None,
        }
    }
}

/// Raw form input from a member.
#[derive(Debug, Clone)]
pub struct Submission {
    pub author_id: u64,
    pub category_key: String,
    pub subject: String,
    pub details: String,
}

/// Who is acting on a request.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: u64,
    pub is_staff: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RequestSummary {
    pub guilds: usize,
    pub total: usize,
    pub open: usize,
    pub claimed: usize,
    pub closed: usize,
}
