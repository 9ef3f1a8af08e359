//! Task-level status derived from assignments and per-user responses.
//!
//! The result is never written back to a response: `ResponseStatus` and
//! `TaskStatus` are separate types and nothing converts the latter into the
//! former.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::db::assignment_repo;
use crate::error::ShiftopsError;
use crate::models::{Assignment, Response, ResponseStatus, Task, TaskStatus};

/// Outcome of resolving one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub status: TaskStatus,
    /// Time of the last completing response when every assignee completed.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Latest response of each assignee, in assignment order. `None` means the
/// user has not responded yet.
pub fn latest_per_assignee<'a>(
    assignments: &'a [Assignment],
    responses: &'a [Response],
) -> Vec<(&'a str, Option<&'a Response>)> {
    let mut latest: HashMap<&str, &Response> = HashMap::new();
    for response in responses {
        let newer = match latest.get(response.user_id.as_str()) {
            Some(current) => {
                (response.responded_at, response.id) > (current.responded_at, current.id)
            }
            None => true,
        };
        if newer {
            latest.insert(response.user_id.as_str(), response);
        }
    }
    assignments
        .iter()
        .map(|a| (a.user_id.as_str(), latest.get(a.user_id.as_str()).copied()))
        .collect()
}

/// Resolve the aggregate status. Identical for individual and group tasks:
/// every assignee must reach `completed` on their own.
pub fn resolve(
    deadline: Option<DateTime<Utc>>,
    assignments: &[Assignment],
    responses: &[Response],
    now: DateTime<Utc>,
) -> Resolution {
    let latest = latest_per_assignee(assignments, responses);
    let status_of = |entry: &(&str, Option<&Response>)| {
        entry.1.map(|r| r.status).unwrap_or(ResponseStatus::Pending)
    };

    let all_completed = !latest.is_empty()
        && latest.iter().all(|e| status_of(e) == ResponseStatus::Completed);
    if all_completed {
        let completed_at = latest
            .iter()
            .filter_map(|(_, r)| r.map(|r| r.responded_at))
            .max();
        let on_time = match deadline {
            Some(deadline) => latest
                .iter()
                .filter_map(|(_, r)| *r)
                .all(|r| r.responded_at <= deadline),
            None => true,
        };
        return Resolution {
            status: if on_time {
                TaskStatus::Completed
            } else {
                TaskStatus::CompletedLate
            },
            completed_at,
        };
    }

    let status = if latest.iter().any(|e| status_of(e) == ResponseStatus::PendingReview) {
        TaskStatus::PendingReview
    } else if deadline.is_some_and(|deadline| now > deadline) {
        TaskStatus::Overdue
    } else if latest.iter().any(|e| status_of(e) == ResponseStatus::Acknowledged) {
        TaskStatus::Acknowledged
    } else {
        TaskStatus::Pending
    };
    Resolution {
        status,
        completed_at: None,
    }
}

pub fn resolve_task(
    task: &Task,
    assignments: &[Assignment],
    responses: &[Response],
    now: DateTime<Utc>,
) -> Resolution {
    resolve(task.deadline_at, assignments, responses, now)
}

/// Load assignments and responses for `task` and resolve.
pub fn load_resolution(conn: &Connection, task: &Task, now: DateTime<Utc>) -> Result<Resolution, ShiftopsError> {
    let assignments = assignment_repo::list_assignments(conn, &task.id)?;
    let responses = assignment_repo::list_responses(conn, &task.id)?;
    Ok(resolve_task(task, &assignments, &responses, now))
}
