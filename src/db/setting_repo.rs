use rusqlite::{params, Connection};

use crate::error::ShiftopsError;
use crate::models::{ArchiveSettings, Setting, SettingKey};

/// Set a value in one scope (`None` = global), replacing any previous value.
pub fn set_setting(
    conn: &Connection,
    dealership_id: Option<&str>,
    key: &str,
    value: &str,
) -> Result<(), ShiftopsError> {
    conn.execute(
        "DELETE FROM settings WHERE dealership_id IS ?1 AND key = ?2",
        params![dealership_id, key],
    )?;
    conn.execute(
        "INSERT INTO settings (dealership_id, key, value) VALUES (?1, ?2, ?3)",
        params![dealership_id, key, value],
    )?;
    Ok(())
}

/// Value stored in exactly this scope, without fallback.
pub fn get_scoped(
    conn: &Connection,
    dealership_id: Option<&str>,
    key: &str,
) -> Result<Option<String>, ShiftopsError> {
    let mut stmt = conn.prepare(
        "SELECT value FROM settings WHERE dealership_id IS ?1 AND key = ?2
         ORDER BY id DESC LIMIT 1",
    )?;
    let mut rows = stmt.query(params![dealership_id, key])?;
    match rows.next()? {
        Some(row) => Ok(Some(row.get(0)?)),
        None => Ok(None),
    }
}

/// Dealership value, falling back to the global value.
pub fn resolve(conn: &Connection, dealership_id: &str, key: &str) -> Result<Option<String>, ShiftopsError> {
    if let Some(value) = get_scoped(conn, Some(dealership_id), key)? {
        return Ok(Some(value));
    }
    get_scoped(conn, None, key)
}

pub fn load_archive_settings(conn: &Connection, dealership_id: &str) -> Result<ArchiveSettings, ShiftopsError> {
    ArchiveSettings::from_lookup(|key: SettingKey| resolve(conn, dealership_id, key.as_str()))
}

pub fn list_settings(conn: &Connection, dealership_id: Option<&str>) -> Result<Vec<Setting>, ShiftopsError> {
    let mut stmt = conn.prepare(
        "SELECT dealership_id, key, value FROM settings
         WHERE dealership_id IS NULL OR dealership_id = ?1
         ORDER BY key ASC, dealership_id IS NULL DESC",
    )?;
    let settings = stmt
        .query_map(params![dealership_id], |row| {
            Ok(Setting {
                dealership_id: row.get(0)?,
                key: row.get(1)?,
                value: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(settings)
}
