use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Priority, ResponseType, TaskType};

/// Task-level status derived from assignments and responses. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Acknowledged,
    PendingReview,
    Completed,
    CompletedLate,
    Overdue,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Acknowledged => "acknowledged",
            Self::PendingReview => "pending_review",
            Self::Completed => "completed",
            Self::CompletedLate => "completed_late",
            Self::Overdue => "overdue",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "acknowledged" => Some(Self::Acknowledged),
            "pending_review" => Some(Self::PendingReview),
            "completed" => Some(Self::Completed),
            "completed_late" => Some(Self::CompletedLate),
            "overdue" => Some(Self::Overdue),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed | Self::CompletedLate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveReason {
    Completed,
    Expired,
    ExpiredAfterShift,
}

impl ArchiveReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Expired => "expired",
            Self::ExpiredAfterShift => "expired_after_shift",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(Self::Completed),
            "expired" => Some(Self::Expired),
            "expired_after_shift" => Some(Self::ExpiredAfterShift),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Task {
    pub id: String,
    pub dealership_id: String,
    pub generator_id: Option<String>,
    pub generation_period: Option<NaiveDate>,
    pub title: String,
    pub description: Option<String>,
    pub task_type: TaskType,
    pub response_type: ResponseType,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub appear_at: DateTime<Utc>,
    pub deadline_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub archive_reason: Option<ArchiveReason>,
    pub created_at: String,
    pub updated_at: String,
}

impl Task {
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}
