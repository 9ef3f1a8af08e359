use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::engine::time;
use crate::error::ShiftopsError;
use crate::models::{Assignment, Response, ResponseStatus};

use super::columns;

pub fn create_assignment(conn: &Connection, task_id: &str, user_id: &str) -> Result<(), ShiftopsError> {
    conn.execute(
        "INSERT OR IGNORE INTO task_assignments (task_id, user_id) VALUES (?1, ?2)",
        params![task_id, user_id],
    )?;
    Ok(())
}

pub fn list_assignments(conn: &Connection, task_id: &str) -> Result<Vec<Assignment>, ShiftopsError> {
    let mut stmt = conn.prepare(
        "SELECT task_id, user_id, created_at FROM task_assignments
         WHERE task_id = ?1 ORDER BY user_id ASC",
    )?;
    let assignments = stmt
        .query_map(params![task_id], |row| {
            Ok(Assignment {
                task_id: row.get(0)?,
                user_id: row.get(1)?,
                created_at: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(assignments)
}

pub fn is_assigned(conn: &Connection, task_id: &str, user_id: &str) -> Result<bool, ShiftopsError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM task_assignments WHERE task_id = ?1 AND user_id = ?2",
        params![task_id, user_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Record a user's current reaction. One row per (task, user); later calls
/// overwrite status, comment and `responded_at`.
pub fn upsert_response(
    conn: &Connection,
    task_id: &str,
    user_id: &str,
    status: ResponseStatus,
    comment: Option<&str>,
    responded_at: DateTime<Utc>,
) -> Result<Response, ShiftopsError> {
    conn.execute(
        "INSERT INTO task_responses (task_id, user_id, status, comment, responded_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (task_id, user_id) DO UPDATE SET
            status = excluded.status,
            comment = excluded.comment,
            responded_at = excluded.responded_at",
        params![task_id, user_id, status.as_str(), comment, time::to_storage(responded_at)],
    )?;
    conn.query_row(
        "SELECT id, task_id, user_id, status, comment, responded_at FROM task_responses
         WHERE task_id = ?1 AND user_id = ?2",
        params![task_id, user_id],
        row_to_response,
    )
    .map_err(ShiftopsError::from)
}

pub fn list_responses(conn: &Connection, task_id: &str) -> Result<Vec<Response>, ShiftopsError> {
    let mut stmt = conn.prepare(
        "SELECT id, task_id, user_id, status, comment, responded_at FROM task_responses
         WHERE task_id = ?1 ORDER BY responded_at ASC, id ASC",
    )?;
    let responses = stmt
        .query_map(params![task_id], row_to_response)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(responses)
}

fn row_to_response(row: &rusqlite::Row) -> rusqlite::Result<Response> {
    Ok(Response {
        id: row.get(0)?,
        task_id: row.get(1)?,
        user_id: row.get(2)?,
        status: columns::text_enum(row, 3, ResponseStatus::from_str)?,
        comment: row.get(4)?,
        responded_at: columns::utc(row, 5)?,
    })
}
