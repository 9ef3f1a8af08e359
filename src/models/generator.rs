use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }
}

/// Organizational only: a group task still needs every assignee to complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Individual,
    Group,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Group => "group",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "individual" => Some(Self::Individual),
            "group" => Some(Self::Group),
            _ => None,
        }
    }
}

/// What kind of reaction an assignee is expected to give.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    Notification,
    Completion,
    CompletionWithProof,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notification => "notification",
            Self::Completion => "completion",
            Self::CompletionWithProof => "completion_with_proof",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "notification" => Some(Self::Notification),
            "completion" => Some(Self::Completion),
            "completion_with_proof" => Some(Self::CompletionWithProof),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Recurring task template owned by a dealership.
///
/// `appear_time`/`deadline_time` and the date fields are wall-clock values in
/// the business timezone. `last_generated_at` is the business-local date of the
/// most recently generated period.
#[derive(Debug, Clone)]
pub struct Generator {
    pub id: String,
    pub dealership_id: String,
    pub title: String,
    pub description: Option<String>,
    pub recurrence: Recurrence,
    pub appear_time: NaiveTime,
    pub deadline_time: Option<NaiveTime>,
    /// ISO weekday numbers, 1 = Monday .. 7 = Sunday.
    pub days_of_week: Vec<u32>,
    /// Positive: day of month (clipped to month length). Negative: counted from month end.
    pub days_of_month: Vec<i32>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub task_type: TaskType,
    pub response_type: ResponseType,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub last_generated_at: Option<NaiveDate>,
    pub is_active: bool,
    pub assignees: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}
