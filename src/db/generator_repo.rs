use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection};

use crate::engine::time;
use crate::error::ShiftopsError;
use crate::models::{Generator, Priority, Recurrence, ResponseType, TaskType};

use super::columns;

/// Definition fields of a generator, as supplied by CRUD callers.
#[derive(Debug, Clone)]
pub struct NewGenerator {
    pub dealership_id: String,
    pub title: String,
    pub description: Option<String>,
    pub recurrence: Recurrence,
    pub appear_time: NaiveTime,
    pub deadline_time: Option<NaiveTime>,
    pub days_of_week: Vec<u32>,
    pub days_of_month: Vec<i32>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub task_type: TaskType,
    pub response_type: ResponseType,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub assignees: Vec<String>,
}

const GENERATOR_COLUMNS: &str = "id, dealership_id, title, description, recurrence, appear_time,
    deadline_time, days_of_week, days_of_month, start_date, end_date, task_type, response_type,
    priority, tags, last_generated_at, is_active, created_at, updated_at";

/// Insert a generator and its assignee set. Run inside a transaction.
pub fn create_generator(conn: &Connection, id: &str, new: &NewGenerator) -> Result<Generator, ShiftopsError> {
    conn.execute(
        "INSERT INTO generators (id, dealership_id, title, description, recurrence, appear_time,
            deadline_time, days_of_week, days_of_month, start_date, end_date, task_type,
            response_type, priority, tags)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            id,
            new.dealership_id,
            new.title,
            new.description,
            new.recurrence.as_str(),
            time::time_to_storage(new.appear_time),
            new.deadline_time.map(time::time_to_storage),
            serde_json::to_string(&new.days_of_week)?,
            serde_json::to_string(&new.days_of_month)?,
            time::date_to_storage(new.start_date),
            new.end_date.map(time::date_to_storage),
            new.task_type.as_str(),
            new.response_type.as_str(),
            new.priority.as_str(),
            serde_json::to_string(&new.tags)?,
        ],
    )?;
    for user_id in &new.assignees {
        conn.execute(
            "INSERT OR IGNORE INTO generator_assignees (generator_id, user_id) VALUES (?1, ?2)",
            params![id, user_id],
        )?;
    }
    get_generator_by_id(conn, id)
}

pub fn get_generator_by_id(conn: &Connection, id: &str) -> Result<Generator, ShiftopsError> {
    let mut generator = conn
        .query_row(
            &format!("SELECT {GENERATOR_COLUMNS} FROM generators WHERE id = ?1"),
            params![id],
            row_to_generator,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => ShiftopsError::generator_not_found(id),
            _ => ShiftopsError::from(e),
        })?;
    generator.assignees = list_assignees(conn, id)?;
    Ok(generator)
}

pub fn resolve_generator(conn: &Connection, reference: &str) -> Result<Generator, ShiftopsError> {
    let id = columns::resolve_id(conn, "generators", reference, ShiftopsError::generator_not_found)?;
    get_generator_by_id(conn, &id)
}

pub fn list_generators(conn: &Connection, dealership_id: Option<&str>) -> Result<Vec<Generator>, ShiftopsError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GENERATOR_COLUMNS} FROM generators
         WHERE ?1 IS NULL OR dealership_id = ?1
         ORDER BY created_at ASC, id ASC"
    ))?;
    let mut generators = stmt
        .query_map(params![dealership_id], row_to_generator)?
        .collect::<Result<Vec<_>, _>>()?;
    for generator in &mut generators {
        generator.assignees = list_assignees(conn, &generator.id)?;
    }
    Ok(generators)
}

/// IDs only: the sweep re-reads each generator under its own lock.
pub fn list_active_generator_ids(conn: &Connection, dealership_id: &str) -> Result<Vec<String>, ShiftopsError> {
    let mut stmt = conn.prepare(
        "SELECT id FROM generators WHERE dealership_id = ?1 AND is_active = 1 ORDER BY id ASC",
    )?;
    let ids = stmt
        .query_map(params![dealership_id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(ids)
}

/// Active generators whose dealership row is gone or deactivated.
pub fn list_orphaned_generator_ids(conn: &Connection) -> Result<Vec<String>, ShiftopsError> {
    let mut stmt = conn.prepare(
        "SELECT g.id FROM generators g
         LEFT JOIN dealerships d ON d.id = g.dealership_id
         WHERE g.is_active = 1 AND (d.id IS NULL OR d.is_active = 0)
         ORDER BY g.id ASC",
    )?;
    let ids = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(ids)
}

pub fn list_assignees(conn: &Connection, generator_id: &str) -> Result<Vec<String>, ShiftopsError> {
    let mut stmt = conn.prepare(
        "SELECT user_id FROM generator_assignees WHERE generator_id = ?1 ORDER BY user_id ASC",
    )?;
    let ids = stmt
        .query_map(params![generator_id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(ids)
}

pub fn set_generator_active(conn: &Connection, id: &str, active: bool) -> Result<(), ShiftopsError> {
    let changed = conn.execute(
        "UPDATE generators SET is_active = ?1, updated_at = datetime('now') WHERE id = ?2",
        params![active, id],
    )?;
    if changed == 0 {
        return Err(ShiftopsError::generator_not_found(id));
    }
    Ok(())
}

/// Compare-and-swap the generation cursor. Returns false when the stored
/// cursor no longer equals `expected`.
pub fn advance_cursor(
    conn: &Connection,
    id: &str,
    expected: Option<NaiveDate>,
    period: NaiveDate,
) -> Result<bool, ShiftopsError> {
    let changed = conn.execute(
        "UPDATE generators SET last_generated_at = ?1, updated_at = datetime('now')
         WHERE id = ?2 AND last_generated_at IS ?3",
        params![
            time::date_to_storage(period),
            id,
            expected.map(time::date_to_storage),
        ],
    )?;
    Ok(changed == 1)
}

fn row_to_generator(row: &rusqlite::Row) -> rusqlite::Result<Generator> {
    Ok(Generator {
        id: row.get(0)?,
        dealership_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        recurrence: columns::text_enum(row, 4, Recurrence::from_str)?,
        appear_time: columns::time_of_day(row, 5)?,
        deadline_time: columns::opt_time_of_day(row, 6)?,
        days_of_week: columns::json_list(row, 7)?,
        days_of_month: columns::json_list(row, 8)?,
        start_date: columns::date(row, 9)?,
        end_date: columns::opt_date(row, 10)?,
        task_type: columns::text_enum(row, 11, TaskType::from_str)?,
        response_type: columns::text_enum(row, 12, ResponseType::from_str)?,
        priority: columns::text_enum(row, 13, Priority::from_str)?,
        tags: columns::json_list(row, 14)?,
        last_generated_at: columns::opt_date(row, 15)?,
        is_active: row.get(16)?,
        assignees: Vec::new(),
        created_at: row.get(17)?,
        updated_at: row.get(18)?,
    })
}
