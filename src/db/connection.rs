use std::fs;
use std::path::Path;

use rusqlite::Connection;

use crate::error::ShiftopsError;

use super::migrations;

/// Open a connection to an existing database. Returns error if not initialized.
pub fn open_db(path: &Path) -> Result<Connection, ShiftopsError> {
    if !path.exists() {
        return Err(ShiftopsError::not_initialized(&path.display().to_string()));
    }
    let conn = Connection::open(path)?;
    configure_connection(&conn)?;
    // Idempotent; picks up tables added since the database was created.
    migrations::run_migrations(&conn)?;
    Ok(conn)
}

/// Initialize the database: create directories, database, and run migrations.
pub fn init_db(path: &Path) -> Result<(), ShiftopsError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ShiftopsError::database(e.to_string()))?;
    }
    let conn = Connection::open(path)?;
    configure_connection(&conn)?;
    migrations::run_migrations(&conn)?;
    tracing::info!(path = %path.display(), "database initialized");
    Ok(())
}

/// In-memory database with the full schema (for tests).
pub fn open_in_memory() -> Result<Connection, ShiftopsError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    migrations::run_migrations(&conn)?;
    Ok(conn)
}

fn configure_connection(conn: &Connection) -> Result<(), ShiftopsError> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA busy_timeout=5000;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Run `f` inside `BEGIN IMMEDIATE`.
///
/// The immediate transaction takes SQLite's write lock up front, so every
/// read inside `f` sees state no other writer can change until commit. Any
/// error rolls the whole unit back.
pub fn immediate<T, F>(conn: &Connection, f: F) -> Result<T, ShiftopsError>
where
    F: FnOnce() -> Result<T, ShiftopsError>,
{
    conn.execute_batch("BEGIN IMMEDIATE")?;
    match f() {
        Ok(value) => {
            if let Err(e) = conn.execute_batch("COMMIT") {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(e.into());
            }
            Ok(value)
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK");
            Err(e)
        }
    }
}
