use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status a user records on a task. Disjoint from the derived `TaskStatus`:
/// there is no `completed_late` or `overdue` here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Pending,
    Acknowledged,
    PendingReview,
    Completed,
    Rejected,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Acknowledged => "acknowledged",
            Self::PendingReview => "pending_review",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "acknowledged" => Some(Self::Acknowledged),
            "pending_review" => Some(Self::PendingReview),
            "completed" => Some(Self::Completed),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub task_id: String,
    pub user_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct Response {
    /// Row id; orders responses that share a `responded_at`.
    pub id: i64,
    pub task_id: String,
    pub user_id: String,
    pub status: ResponseStatus,
    pub comment: Option<String>,
    pub responded_at: DateTime<Utc>,
}
