use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};

use crate::engine::time;
use crate::error::ShiftopsError;
use crate::models::{ArchiveReason, Priority, ResponseType, Task, TaskType};

use super::columns;

#[derive(Debug, Clone)]
pub struct NewTask<'a> {
    pub dealership_id: &'a str,
    pub generator_id: Option<&'a str>,
    pub generation_period: Option<NaiveDate>,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub task_type: TaskType,
    pub response_type: ResponseType,
    pub priority: Priority,
    pub tags: &'a [String],
    pub appear_at: DateTime<Utc>,
    pub deadline_at: Option<DateTime<Utc>>,
}

const TASK_COLUMNS: &str = "id, dealership_id, generator_id, generation_period, title, description,
    task_type, response_type, priority, tags, appear_at, deadline_at, is_active, archived_at,
    archive_reason, created_at, updated_at";

pub fn create_task(conn: &Connection, id: &str, new: &NewTask) -> Result<Task, ShiftopsError> {
    conn.execute(
        "INSERT INTO tasks (id, dealership_id, generator_id, generation_period, title, description,
            task_type, response_type, priority, tags, appear_at, deadline_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            id,
            new.dealership_id,
            new.generator_id,
            new.generation_period.map(time::date_to_storage),
            new.title,
            new.description,
            new.task_type.as_str(),
            new.response_type.as_str(),
            new.priority.as_str(),
            serde_json::to_string(new.tags)?,
            time::to_storage(new.appear_at),
            new.deadline_at.map(time::to_storage),
        ],
    )?;
    get_task_by_id(conn, id)
}

pub fn get_task_by_id(conn: &Connection, id: &str) -> Result<Task, ShiftopsError> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
        params![id],
        row_to_task,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => ShiftopsError::task_not_found(id),
        _ => ShiftopsError::from(e),
    })
}

pub fn resolve_task(conn: &Connection, reference: &str) -> Result<Task, ShiftopsError> {
    let id = columns::resolve_id(conn, "tasks", reference, ShiftopsError::task_not_found)?;
    get_task_by_id(conn, &id)
}

/// Tasks of a dealership (or all), newest appearance first.
pub fn list_tasks(
    conn: &Connection,
    dealership_id: Option<&str>,
    include_archived: bool,
) -> Result<Vec<Task>, ShiftopsError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks
         WHERE (?1 IS NULL OR dealership_id = ?1)
           AND (?2 OR archived_at IS NULL)
         ORDER BY appear_at DESC, id ASC"
    ))?;
    let tasks = stmt
        .query_map(params![dealership_id, include_archived], row_to_task)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tasks)
}

pub fn list_active_task_ids(conn: &Connection, dealership_id: &str) -> Result<Vec<String>, ShiftopsError> {
    let mut stmt = conn.prepare(
        "SELECT id FROM tasks WHERE dealership_id = ?1 AND is_active = 1 ORDER BY appear_at ASC, id ASC",
    )?;
    let ids = stmt
        .query_map(params![dealership_id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(ids)
}

/// Active tasks whose deadline lies inside `[from, to]`.
pub fn list_active_with_deadline_between(
    conn: &Connection,
    dealership_id: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<Task>, ShiftopsError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks
         WHERE dealership_id = ?1 AND is_active = 1
           AND deadline_at IS NOT NULL AND deadline_at >= ?2 AND deadline_at <= ?3
         ORDER BY deadline_at ASC, id ASC"
    ))?;
    let tasks = stmt
        .query_map(
            params![dealership_id, time::to_storage(from), time::to_storage(to)],
            row_to_task,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tasks)
}

pub fn tasks_for_generator(conn: &Connection, generator_id: &str) -> Result<Vec<Task>, ShiftopsError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE generator_id = ?1 ORDER BY generation_period ASC"
    ))?;
    let tasks = stmt
        .query_map(params![generator_id], row_to_task)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tasks)
}

/// One-way transition to archived. Returns false if the task was already archived.
pub fn archive_task(
    conn: &Connection,
    id: &str,
    reason: ArchiveReason,
    now: DateTime<Utc>,
) -> Result<bool, ShiftopsError> {
    let changed = conn.execute(
        "UPDATE tasks SET is_active = 0, archived_at = ?1, archive_reason = ?2,
            updated_at = datetime('now')
         WHERE id = ?3 AND archived_at IS NULL",
        params![time::to_storage(now), reason.as_str(), id],
    )?;
    Ok(changed == 1)
}

fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
    let archive_reason: Option<String> = row.get(14)?;
    Ok(Task {
        id: row.get(0)?,
        dealership_id: row.get(1)?,
        generator_id: row.get(2)?,
        generation_period: columns::opt_date(row, 3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        task_type: columns::text_enum(row, 6, TaskType::from_str)?,
        response_type: columns::text_enum(row, 7, ResponseType::from_str)?,
        priority: columns::text_enum(row, 8, Priority::from_str)?,
        tags: columns::json_list(row, 9)?,
        appear_at: columns::utc(row, 10)?,
        deadline_at: columns::opt_utc(row, 11)?,
        is_active: row.get(12)?,
        archived_at: columns::opt_utc(row, 13)?,
        archive_reason: archive_reason.as_deref().and_then(ArchiveReason::from_str),
        created_at: row.get(15)?,
        updated_at: row.get(16)?,
    })
}
