use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::engine::time;
use crate::error::ShiftopsError;
use crate::models::Shift;

use super::columns;

const SHIFT_COLUMNS: &str =
    "id, dealership_id, user_id, shift_start, shift_end, archived_tasks_processed";

pub fn open_shift(
    conn: &Connection,
    id: &str,
    dealership_id: &str,
    user_id: &str,
    shift_start: DateTime<Utc>,
) -> Result<Shift, ShiftopsError> {
    conn.execute(
        "INSERT INTO shifts (id, dealership_id, user_id, shift_start) VALUES (?1, ?2, ?3, ?4)",
        params![id, dealership_id, user_id, time::to_storage(shift_start)],
    )?;
    get_shift_by_id(conn, id)
}

pub fn close_shift(conn: &Connection, id: &str, shift_end: DateTime<Utc>) -> Result<Shift, ShiftopsError> {
    let changed = conn.execute(
        "UPDATE shifts SET shift_end = ?1 WHERE id = ?2 AND shift_end IS NULL",
        params![time::to_storage(shift_end), id],
    )?;
    if changed == 0 {
        let shift = get_shift_by_id(conn, id)?;
        if shift.is_closed() {
            return Err(ShiftopsError::shift_already_closed(id));
        }
    }
    get_shift_by_id(conn, id)
}

pub fn get_shift_by_id(conn: &Connection, id: &str) -> Result<Shift, ShiftopsError> {
    conn.query_row(
        &format!("SELECT {SHIFT_COLUMNS} FROM shifts WHERE id = ?1"),
        params![id],
        row_to_shift,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => ShiftopsError::shift_not_found(id),
        _ => ShiftopsError::from(e),
    })
}

pub fn resolve_shift(conn: &Connection, reference: &str) -> Result<Shift, ShiftopsError> {
    let id = columns::resolve_id(conn, "shifts", reference, ShiftopsError::shift_not_found)?;
    get_shift_by_id(conn, &id)
}

pub fn list_shifts(conn: &Connection, dealership_id: Option<&str>) -> Result<Vec<Shift>, ShiftopsError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SHIFT_COLUMNS} FROM shifts
         WHERE ?1 IS NULL OR dealership_id = ?1
         ORDER BY shift_start DESC, id ASC"
    ))?;
    let shifts = stmt
        .query_map(params![dealership_id], row_to_shift)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(shifts)
}

/// Closed shifts the shift-triggered expiry sweep has not handled yet.
pub fn list_unprocessed_closed(conn: &Connection) -> Result<Vec<Shift>, ShiftopsError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SHIFT_COLUMNS} FROM shifts
         WHERE shift_end IS NOT NULL AND archived_tasks_processed = 0
         ORDER BY shift_end ASC, id ASC"
    ))?;
    let shifts = stmt
        .query_map([], row_to_shift)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(shifts)
}

/// Flip the processed flag once. Returns false if it was already set.
pub fn mark_processed(conn: &Connection, id: &str) -> Result<bool, ShiftopsError> {
    let changed = conn.execute(
        "UPDATE shifts SET archived_tasks_processed = 1
         WHERE id = ?1 AND archived_tasks_processed = 0",
        params![id],
    )?;
    Ok(changed == 1)
}

fn row_to_shift(row: &rusqlite::Row) -> rusqlite::Result<Shift> {
    Ok(Shift {
        id: row.get(0)?,
        dealership_id: row.get(1)?,
        user_id: row.get(2)?,
        shift_start: columns::utc(row, 3)?,
        shift_end: columns::opt_utc(row, 4)?,
        archived_tasks_processed: row.get(5)?,
    })
}
