//! Typed column readers shared by the repositories.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::de::DeserializeOwned;

use crate::engine::time;
use crate::error::ShiftopsError;

fn conversion(idx: usize, e: ShiftopsError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

pub fn utc(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    time::from_storage(&raw).map_err(|e| conversion(idx, e))
}

pub fn opt_utc(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| time::from_storage(&s).map_err(|e| conversion(idx, e)))
        .transpose()
}

pub fn date(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    time::date_from_storage(&raw).map_err(|e| conversion(idx, e))
}

pub fn opt_date(row: &Row, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| time::date_from_storage(&s).map_err(|e| conversion(idx, e)))
        .transpose()
}

pub fn time_of_day(row: &Row, idx: usize) -> rusqlite::Result<NaiveTime> {
    let raw: String = row.get(idx)?;
    time::parse_time_of_day(&raw).map_err(|e| conversion(idx, e))
}

pub fn opt_time_of_day(row: &Row, idx: usize) -> rusqlite::Result<Option<NaiveTime>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| time::parse_time_of_day(&s).map_err(|e| conversion(idx, e)))
        .transpose()
}

/// JSON-encoded list column (`days_of_week`, `tags`, ...).
pub fn json_list<T: DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<Vec<T>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion(idx, e.into()))
}

/// Enum stored as text, decoded with the model's `from_str`.
pub fn text_enum<T>(row: &Row, idx: usize, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or_else(|| {
        conversion(
            idx,
            ShiftopsError::database(format!("Unexpected stored value '{raw}'")),
        )
    })
}

/// Resolve an ID reference: exact match first, then unique prefix.
pub fn resolve_id(
    conn: &Connection,
    table: &'static str,
    reference: &str,
    not_found: fn(&str) -> ShiftopsError,
) -> Result<String, ShiftopsError> {
    let exact: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE id = ?1"),
        params![reference],
        |row| row.get(0),
    )?;
    if exact == 1 {
        return Ok(reference.to_string());
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT id FROM {table} WHERE id LIKE ?1 ORDER BY id LIMIT 10"
    ))?;
    let prefix = format!("{reference}%");
    let ids = stmt
        .query_map(params![prefix], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    match ids.len() {
        0 => Err(not_found(reference)),
        1 => Ok(ids.into_iter().next().unwrap_or_default()),
        _ => Err(ShiftopsError::ambiguous_ref(reference, &ids)),
    }
}
