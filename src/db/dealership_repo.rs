use rusqlite::{params, Connection};

use crate::error::ShiftopsError;
use crate::models::{Dealership, User};

use super::columns;

pub fn create_dealership(conn: &Connection, id: &str, name: &str) -> Result<Dealership, ShiftopsError> {
    if find_dealership_by_name(conn, name)?.is_some() {
        return Err(ShiftopsError::validation(format!(
            "Dealership with name '{name}' already exists"
        )));
    }
    conn.execute(
        "INSERT INTO dealerships (id, name) VALUES (?1, ?2)",
        params![id, name],
    )?;
    get_dealership_by_id(conn, id)
}

pub fn get_dealership_by_id(conn: &Connection, id: &str) -> Result<Dealership, ShiftopsError> {
    find_dealership(conn, id)?.ok_or_else(|| ShiftopsError::dealership_not_found(id))
}

pub fn find_dealership(conn: &Connection, id: &str) -> Result<Option<Dealership>, ShiftopsError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, is_active, created_at FROM dealerships WHERE id = ?1",
    )?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_dealership(row)?)),
        None => Ok(None),
    }
}

pub fn find_dealership_by_name(conn: &Connection, name: &str) -> Result<Option<Dealership>, ShiftopsError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, is_active, created_at FROM dealerships WHERE name = ?1",
    )?;
    let mut rows = stmt.query(params![name])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_dealership(row)?)),
        None => Ok(None),
    }
}

/// Resolve a dealership reference: exact name → ID / ID prefix.
pub fn resolve_dealership(conn: &Connection, reference: &str) -> Result<Dealership, ShiftopsError> {
    if let Some(dealership) = find_dealership_by_name(conn, reference)? {
        return Ok(dealership);
    }
    let id = columns::resolve_id(conn, "dealerships", reference, ShiftopsError::dealership_not_found)?;
    get_dealership_by_id(conn, &id)
}

pub fn list_dealerships(conn: &Connection) -> Result<Vec<Dealership>, ShiftopsError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, is_active, created_at FROM dealerships ORDER BY name ASC",
    )?;
    let dealerships = stmt
        .query_map([], row_to_dealership)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(dealerships)
}

pub fn list_active_dealerships(conn: &Connection) -> Result<Vec<Dealership>, ShiftopsError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, is_active, created_at FROM dealerships
         WHERE is_active = 1 ORDER BY name ASC",
    )?;
    let dealerships = stmt
        .query_map([], row_to_dealership)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(dealerships)
}

pub fn set_dealership_active(conn: &Connection, id: &str, active: bool) -> Result<(), ShiftopsError> {
    let changed = conn.execute(
        "UPDATE dealerships SET is_active = ?1 WHERE id = ?2",
        params![active, id],
    )?;
    if changed == 0 {
        return Err(ShiftopsError::dealership_not_found(id));
    }
    Ok(())
}

pub fn create_user(conn: &Connection, id: &str, dealership_id: &str, name: &str) -> Result<User, ShiftopsError> {
    conn.execute(
        "INSERT INTO users (id, dealership_id, name) VALUES (?1, ?2, ?3)",
        params![id, dealership_id, name],
    )?;
    get_user_by_id(conn, id)
}

pub fn get_user_by_id(conn: &Connection, id: &str) -> Result<User, ShiftopsError> {
    find_user(conn, id)?.ok_or_else(|| ShiftopsError::user_not_found(id))
}

pub fn find_user(conn: &Connection, id: &str) -> Result<Option<User>, ShiftopsError> {
    let mut stmt = conn.prepare(
        "SELECT id, dealership_id, name, is_active FROM users WHERE id = ?1",
    )?;
    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_user(row)?)),
        None => Ok(None),
    }
}

pub fn resolve_user(conn: &Connection, reference: &str) -> Result<User, ShiftopsError> {
    let id = columns::resolve_id(conn, "users", reference, ShiftopsError::user_not_found)?;
    get_user_by_id(conn, &id)
}

pub fn list_users(conn: &Connection, dealership_id: Option<&str>) -> Result<Vec<User>, ShiftopsError> {
    let mut stmt = conn.prepare(
        "SELECT id, dealership_id, name, is_active FROM users
         WHERE ?1 IS NULL OR dealership_id = ?1
         ORDER BY name ASC",
    )?;
    let users = stmt
        .query_map(params![dealership_id], row_to_user)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

pub fn set_user_active(conn: &Connection, id: &str, active: bool) -> Result<(), ShiftopsError> {
    let changed = conn.execute(
        "UPDATE users SET is_active = ?1 WHERE id = ?2",
        params![active, id],
    )?;
    if changed == 0 {
        return Err(ShiftopsError::user_not_found(id));
    }
    Ok(())
}

fn row_to_dealership(row: &rusqlite::Row) -> rusqlite::Result<Dealership> {
    Ok(Dealership {
        id: row.get(0)?,
        name: row.get(1)?,
        is_active: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        dealership_id: row.get(1)?,
        name: row.get(2)?,
        is_active: row.get(3)?,
    })
}
